//! Connected account CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use engagehub_core::error::AppError;
use engagehub_core::types::id::AccountId;

use crate::output::{self, OutputFormat};

/// Arguments for account commands
#[derive(Debug, Args)]
pub struct AccountsArgs {
    /// Accounts subcommand
    #[command(subcommand)]
    pub command: AccountsCommand,
}

/// Account subcommands
#[derive(Debug, Subcommand)]
pub enum AccountsCommand {
    /// List all known accounts with their usage
    List,
    /// Rebuild usage counters from the action history log
    Recompute {
        /// Limit the repair to one account id
        #[arg(long)]
        account: Option<String>,
    },
}

/// One account row of the list output
#[derive(Debug, Serialize, Tabled)]
struct AccountRow {
    /// Account id
    id: String,
    /// Username
    username: String,
    /// Active flag
    active: bool,
    /// Cumulative pack usage
    used: u64,
    /// Likes today
    like: u64,
    /// Retweets today
    retweet: u64,
    /// Replies today
    reply: u64,
}

/// Execute account commands
pub async fn execute(args: &AccountsArgs, env: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let engine = super::open_engine(&config).await?;

    match &args.command {
        AccountsCommand::List => {
            let stats = engine.stats().await;
            let rows: Vec<AccountRow> = stats
                .accounts
                .iter()
                .map(|a| AccountRow {
                    id: a.id.to_string(),
                    username: a.username.clone(),
                    active: a.is_active,
                    used: a.actions_used,
                    like: a.daily_used.like,
                    retweet: a.daily_used.retweet,
                    reply: a.daily_used.reply,
                })
                .collect();
            output::print_list(&rows, format);
        }
        AccountsCommand::Recompute { account } => match account {
            Some(id) => {
                let totals = engine.repair_account(&AccountId::new(id.clone())).await?;
                output::print_success(&format!(
                    "Account {id}: {} pack actions, {} today",
                    totals.actions_used,
                    totals.daily_used.total()
                ));
            }
            None => {
                let changed = engine.repair_all_from_history().await?;
                if changed {
                    output::print_success("Counters rebuilt from history");
                } else {
                    output::print_warning("Counters already matched the history log");
                }
            }
        },
    }

    Ok(())
}
