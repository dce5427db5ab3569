//! Global pack CLI commands.

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};

use engagehub_core::error::AppError;
use engagehub_entity::pack::PackType;

use crate::output;

/// Arguments for pack commands
#[derive(Debug, Args)]
pub struct PackArgs {
    /// Pack subcommand
    #[command(subcommand)]
    pub command: PackCommand,
}

/// Pack subcommands
#[derive(Debug, Subcommand)]
pub enum PackCommand {
    /// Re-purchase the global pack, resetting all pack usage counters
    Update {
        /// Total actions of the new pack
        #[arg(long)]
        total: u64,
        /// Pack tier: basic, premium, or enterprise
        #[arg(long, default_value = "basic")]
        pack_type: String,
        /// Optional expiry (RFC 3339)
        #[arg(long)]
        expiry: Option<String>,
    },
}

/// Execute pack commands
pub async fn execute(args: &PackArgs, env: &str) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let engine = super::open_engine(&config).await?;

    match &args.command {
        PackCommand::Update {
            total,
            pack_type,
            expiry,
        } => {
            let pack_type: PackType = pack_type.parse()?;
            let expiry = expiry
                .as_deref()
                .map(|raw| {
                    raw.parse::<DateTime<Utc>>().map_err(|e| {
                        AppError::validation(format!("Invalid expiry '{raw}': {e}"))
                    })
                })
                .transpose()?;

            engine.update_global_pack(*total, pack_type, expiry).await?;
            output::print_success(&format!(
                "Pack updated: {total} actions ({pack_type}), usage counters reset"
            ));
        }
    }

    Ok(())
}
