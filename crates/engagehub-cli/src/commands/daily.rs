//! Daily quota CLI commands.

use clap::{Args, Subcommand};

use engagehub_core::error::AppError;
use engagehub_core::types::action::Distribution;

use crate::output;

/// Arguments for daily quota commands
#[derive(Debug, Args)]
pub struct DailyArgs {
    /// Daily subcommand
    #[command(subcommand)]
    pub command: DailyCommand,
}

/// Daily quota subcommands
#[derive(Debug, Subcommand)]
pub enum DailyCommand {
    /// Zero today's counters immediately
    Reset,
    /// Change the shared daily limit and optionally the distribution
    Limit {
        /// New daily action ceiling
        #[arg(long)]
        limit: u64,
        /// Percentage of the daily budget for likes
        #[arg(long)]
        like: Option<u32>,
        /// Percentage of the daily budget for retweets
        #[arg(long)]
        retweet: Option<u32>,
        /// Percentage of the daily budget for replies
        #[arg(long)]
        reply: Option<u32>,
    },
}

/// Execute daily quota commands
pub async fn execute(args: &DailyArgs, env: &str) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let engine = super::open_engine(&config).await?;

    match &args.command {
        DailyCommand::Reset => {
            engine.reset_daily_counters().await?;
            output::print_success("Daily counters reset");
        }
        DailyCommand::Limit {
            limit,
            like,
            retweet,
            reply,
        } => {
            let distribution = match (like, retweet, reply) {
                (None, None, None) => None,
                (Some(like), Some(retweet), Some(reply)) => Some(Distribution {
                    like: *like,
                    retweet: *retweet,
                    reply: *reply,
                }),
                _ => {
                    return Err(AppError::validation(
                        "Either all of --like/--retweet/--reply or none must be given",
                    ));
                }
            };

            engine.set_daily_limit(*limit, distribution).await?;
            output::print_success(&format!("Daily limit set to {limit}"));
        }
    }

    Ok(())
}
