//! CLI command definitions and dispatch.

pub mod accounts;
pub mod daily;
pub mod pack;
pub mod stats;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use engagehub_core::config::AppConfig;
use engagehub_core::error::AppError;
use engagehub_core::traits::clock::SystemClock;
use engagehub_quota::QuotaEngine;
use engagehub_store::history::JsonlHistoryLog;
use engagehub_store::json::JsonStateStore;

use crate::output::OutputFormat;

/// EngageHub — engagement quota administration
#[derive(Debug, Parser)]
#[command(name = "engagehub", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment overlay (config/<env>.toml)
    #[arg(short, long, default_value = "default")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show pack, daily quota, and allocation status
    Stats,
    /// Global pack management
    Pack(pack::PackArgs),
    /// Daily quota management
    Daily(daily::DailyArgs),
    /// Connected account management
    Accounts(accounts::AccountsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Stats => stats::execute(&self.env, self.format).await,
            Commands::Pack(args) => pack::execute(args, &self.env).await,
            Commands::Daily(args) => daily::execute(args, &self.env).await,
            Commands::Accounts(args) => accounts::execute(args, &self.env, self.format).await,
        }
    }
}

/// Helper: load configuration for the given environment
pub fn load_config(env: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(env)
}

/// Helper: open the quota engine over the configured state and history files
pub async fn open_engine(config: &AppConfig) -> Result<QuotaEngine, AppError> {
    let store = Arc::new(JsonStateStore::new(&config.store.state_file));
    let history = Arc::new(JsonlHistoryLog::new(&config.store.history_file));
    QuotaEngine::open(store, history, Arc::new(SystemClock), &config.quota).await
}
