//! Scan loop, watchdog, selection, and delay configuration.

use serde::{Deserialize, Serialize};

/// Scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Whether the scan loop runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Interval in seconds between scan cycles.
    #[serde(default = "default_scan_interval")]
    pub scan_interval_seconds: u64,
    /// Interval in seconds between account reconciliation runs.
    #[serde(default = "default_reconcile_interval")]
    pub reconcile_interval_seconds: u64,
    /// Scan watchdog settings.
    #[serde(default)]
    pub watchdog: WatchdogConfig,
    /// Per-type attempt probabilities.
    #[serde(default)]
    pub probabilities: SelectionProbabilities,
    /// Randomized inter-action delay ranges.
    #[serde(default)]
    pub delays: DelayConfig,
    /// Smart (deferred) scheduling settings.
    #[serde(default)]
    pub smart: SmartSchedulingConfig,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            scan_interval_seconds: default_scan_interval(),
            reconcile_interval_seconds: default_reconcile_interval(),
            watchdog: WatchdogConfig::default(),
            probabilities: SelectionProbabilities::default(),
            delays: DelayConfig::default(),
            smart: SmartSchedulingConfig::default(),
        }
    }
}

/// Scan-recovery watchdog settings.
///
/// The watchdog favors availability over strict mutual exclusion: a scan
/// stuck past `max_scan_duration_seconds` is forcibly reset so future scans
/// can run, even if that risks a duplicate scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchdogConfig {
    /// Poll interval of the watchdog loop in seconds.
    #[serde(default = "default_watchdog_poll")]
    pub poll_interval_seconds: u64,
    /// Hard ceiling on scan duration before a forced reset, in seconds.
    #[serde(default = "default_max_scan_duration")]
    pub max_scan_duration_seconds: u64,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_watchdog_poll(),
            max_scan_duration_seconds: default_max_scan_duration(),
        }
    }
}

/// Probability that each action type is attempted for a candidate.
///
/// Every selected type is still individually gated by admission control;
/// these probabilities only shape engagement diversity under quota pressure.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SelectionProbabilities {
    /// Probability of attempting a reply.
    #[serde(default = "default_reply_probability")]
    pub reply: f64,
    /// Probability of attempting a like.
    #[serde(default = "default_like_probability")]
    pub like: f64,
    /// Probability of attempting a retweet.
    #[serde(default = "default_retweet_probability")]
    pub retweet: f64,
}

impl Default for SelectionProbabilities {
    fn default() -> Self {
        Self {
            reply: default_reply_probability(),
            like: default_like_probability(),
            retweet: default_retweet_probability(),
        }
    }
}

/// One randomized delay range in milliseconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DelayRange {
    /// Lower bound in milliseconds.
    pub min_ms: u64,
    /// Upper bound in milliseconds.
    pub max_ms: u64,
}

impl DelayRange {
    const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }
}

/// Randomized cooperative delays between actions and accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelayConfig {
    /// Delay after a like attempt.
    #[serde(default = "default_like_delay")]
    pub like: DelayRange,
    /// Delay after a retweet attempt.
    #[serde(default = "default_retweet_delay")]
    pub retweet: DelayRange,
    /// Delay after a reply attempt.
    #[serde(default = "default_reply_delay")]
    pub reply: DelayRange,
    /// Delay between accounts within one candidate.
    #[serde(default = "default_account_delay")]
    pub between_accounts: DelayRange,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            like: default_like_delay(),
            retweet: default_retweet_delay(),
            reply: default_reply_delay(),
            between_accounts: default_account_delay(),
        }
    }
}

/// Smart scheduling defers actions into engagement-optimal time windows
/// instead of executing them inline during the scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmartSchedulingConfig {
    /// Whether smart scheduling is enabled.
    #[serde(default)]
    pub enabled: bool,
    /// Interval in seconds between dispatch polls for due actions.
    #[serde(default = "default_dispatch_interval")]
    pub dispatch_interval_seconds: u64,
}

impl Default for SmartSchedulingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dispatch_interval_seconds: default_dispatch_interval(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_scan_interval() -> u64 {
    300
}

fn default_dispatch_interval() -> u64 {
    30
}

fn default_reconcile_interval() -> u64 {
    600
}

fn default_watchdog_poll() -> u64 {
    60
}

fn default_max_scan_duration() -> u64 {
    600
}

fn default_reply_probability() -> f64 {
    1.0
}

fn default_like_probability() -> f64 {
    0.5
}

fn default_retweet_probability() -> f64 {
    0.1
}

fn default_like_delay() -> DelayRange {
    DelayRange::new(2_000, 8_000)
}

fn default_retweet_delay() -> DelayRange {
    DelayRange::new(3_000, 10_000)
}

fn default_reply_delay() -> DelayRange {
    DelayRange::new(5_000, 15_000)
}

fn default_account_delay() -> DelayRange {
    DelayRange::new(5_000, 20_000)
}
