//! Scan-recovery watchdog.

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use tokio::sync::watch;
use tokio::time;
use tracing::{info, warn};

use engagehub_core::config::scheduler::WatchdogConfig;
use engagehub_core::traits::clock::Clock;

use crate::guard::{ScanGuard, ScanStatus};

/// Watches the scan guard and forcibly recovers scans that never finished.
///
/// Favors availability over strict mutual exclusion: a scan stuck past the
/// configured ceiling is reset so future cycles can run, even if the stuck
/// scan is in fact still alive somewhere.
#[derive(Debug)]
pub struct ScanWatchdog {
    guard: Arc<ScanGuard>,
    clock: Arc<dyn Clock>,
    config: WatchdogConfig,
}

impl ScanWatchdog {
    /// Create a watchdog over the given guard.
    pub fn new(guard: Arc<ScanGuard>, clock: Arc<dyn Clock>, config: WatchdogConfig) -> Self {
        Self {
            guard,
            clock,
            config,
        }
    }

    /// One watchdog evaluation. Returns `true` when a forced reset ran.
    pub fn check_once(&self) -> bool {
        let ScanStatus::Scanning { started_at } = self.guard.status() else {
            return false;
        };

        match started_at {
            None => {
                warn!("Scan marked running with no start timestamp, forcing reset");
                self.guard.force_reset();
                true
            }
            Some(started_at) => {
                let elapsed = self.clock.now() - started_at;
                let ceiling = TimeDelta::seconds(self.config.max_scan_duration_seconds as i64);
                if elapsed > ceiling {
                    warn!(
                        elapsed_seconds = elapsed.num_seconds(),
                        ceiling_seconds = self.config.max_scan_duration_seconds,
                        "Scan exceeded maximum duration, forcing reset"
                    );
                    self.guard.force_reset();
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Poll until the cancel signal flips.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        info!(
            poll_interval_seconds = self.config.poll_interval_seconds,
            max_scan_duration_seconds = self.config.max_scan_duration_seconds,
            "Scan watchdog started"
        );

        let poll_interval = Duration::from_secs(self.config.poll_interval_seconds);

        loop {
            tokio::select! {
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        info!("Scan watchdog received shutdown signal");
                        break;
                    }
                }
                _ = time::sleep(poll_interval) => {
                    self.check_once();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use engagehub_core::traits::clock::ManualClock;

    fn watchdog(guard: Arc<ScanGuard>, clock: Arc<ManualClock>) -> ScanWatchdog {
        ScanWatchdog::new(
            guard,
            clock,
            WatchdogConfig {
                poll_interval_seconds: 60,
                max_scan_duration_seconds: 600,
            },
        )
    }

    #[test]
    fn test_idle_guard_is_left_alone() {
        let guard = Arc::new(ScanGuard::new());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        assert!(!watchdog(guard.clone(), clock).check_once());
        assert_eq!(guard.status(), ScanStatus::Idle);
    }

    #[test]
    fn test_healthy_scan_is_left_alone() {
        let guard = Arc::new(ScanGuard::new());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        guard.try_begin(clock.now());

        clock.advance(TimeDelta::seconds(599));
        assert!(!watchdog(guard.clone(), clock).check_once());
        assert!(matches!(guard.status(), ScanStatus::Scanning { .. }));
    }

    #[test]
    fn test_overdue_scan_is_reset() {
        let guard = Arc::new(ScanGuard::new());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        guard.try_begin(clock.now());

        clock.advance(TimeDelta::seconds(601));
        assert!(watchdog(guard.clone(), clock).check_once());
        assert_eq!(guard.status(), ScanStatus::Idle);
    }

    #[test]
    fn test_timestampless_scan_is_reset_immediately() {
        let guard = Arc::new(ScanGuard::new());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        guard.begin_without_timestamp();

        assert!(watchdog(guard.clone(), clock).check_once());
        assert_eq!(guard.status(), ScanStatus::Idle);
    }
}
