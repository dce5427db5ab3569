//! Stats CLI command.

use engagehub_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Execute the stats command
pub async fn execute(env: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let engine = super::open_engine(&config).await?;
    let stats = engine.stats().await;

    if format == OutputFormat::Json {
        output::print_json(&stats);
        return Ok(());
    }

    println!("Global Pack:");
    output::print_kv("Type", &stats.global_pack.pack_type.to_string());
    output::print_kv("Total", &stats.global_pack.total_actions.to_string());
    output::print_kv("Used", &stats.global_pack.used_actions.to_string());
    output::print_kv("Remaining", &stats.global_pack.remaining_actions.to_string());
    output::print_kv("Purchased", &stats.global_pack.purchase_date.to_rfc3339());
    if let Some(expiry) = stats.global_pack.expiry_date {
        output::print_kv("Expires", &expiry.to_rfc3339());
    }

    println!("Daily Quota:");
    output::print_kv("Limit", &stats.daily_quota.daily_limit.to_string());
    output::print_kv("Used Today", &stats.daily_quota.used_today.to_string());
    output::print_kv("Last Reset", &stats.daily_quota.last_reset.to_string());
    output::print_kv(
        "Distribution",
        &format!(
            "like {}% / retweet {}% / reply {}%",
            stats.daily_quota.distribution.like,
            stats.daily_quota.distribution.retweet,
            stats.daily_quota.distribution.reply
        ),
    );

    println!("Allocation:");
    output::print_kv("Active Accounts", &stats.active_accounts.to_string());
    output::print_kv(
        "Per-Account Quota",
        &stats.allocation.per_account_quota.to_string(),
    );
    output::print_kv(
        "Per-Account Daily",
        &stats.allocation.per_account_daily.to_string(),
    );
    output::print_kv(
        "Recalculated",
        &stats.allocation.last_recalculation.to_rfc3339(),
    );

    Ok(())
}
