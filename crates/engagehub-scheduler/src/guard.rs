//! Scan mutual-exclusion guard.

use std::sync::Mutex;

use chrono::{DateTime, Utc};

/// Current phase of the scan guard, for the watchdog and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    /// No scan in progress.
    Idle,
    /// A scan started at the given instant.
    Scanning {
        /// When the running scan began, if recorded.
        ///
        /// `None` is an anomaly (a crashed writer between state flips); the
        /// watchdog treats it as immediately overdue.
        started_at: Option<DateTime<Utc>>,
    },
}

/// Prevents overlapping scan cycles.
///
/// Plain `std::sync::Mutex` — every critical section is a couple of field
/// writes with no await points.
#[derive(Debug, Default)]
pub struct ScanGuard {
    inner: Mutex<GuardState>,
}

#[derive(Debug, Default)]
struct GuardState {
    scanning: bool,
    started_at: Option<DateTime<Utc>>,
}

impl ScanGuard {
    /// Create an idle guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to move `idle -> scanning`, recording the start instant.
    ///
    /// Returns `false` when a scan is already running.
    pub fn try_begin(&self, now: DateTime<Utc>) -> bool {
        let mut inner = self.inner.lock().expect("scan guard poisoned");
        if inner.scanning {
            return false;
        }
        inner.scanning = true;
        inner.started_at = Some(now);
        true
    }

    /// Move back to idle after a completed (or failed) scan.
    pub fn finish(&self) {
        let mut inner = self.inner.lock().expect("scan guard poisoned");
        inner.scanning = false;
        inner.started_at = None;
    }

    /// Forcibly move back to idle, regardless of the recorded state.
    ///
    /// Used by the watchdog to recover from a scan that died without
    /// finishing. The interrupted scan may still be running; a duplicate
    /// scan is the accepted price of not blocking forever.
    pub fn force_reset(&self) {
        let mut inner = self.inner.lock().expect("scan guard poisoned");
        inner.scanning = false;
        inner.started_at = None;
    }

    /// Current status.
    pub fn status(&self) -> ScanStatus {
        let inner = self.inner.lock().expect("scan guard poisoned");
        if inner.scanning {
            ScanStatus::Scanning {
                started_at: inner.started_at,
            }
        } else {
            ScanStatus::Idle
        }
    }

    /// Flip to scanning without a start timestamp, reproducing the anomaly
    /// the watchdog must recover from.
    #[cfg(test)]
    pub(crate) fn begin_without_timestamp(&self) {
        let mut inner = self.inner.lock().expect("scan guard poisoned");
        inner.scanning = true;
        inner.started_at = None;
    }
}
