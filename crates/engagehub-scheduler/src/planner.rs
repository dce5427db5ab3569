//! Smart scheduling: defer admitted actions into engagement-optimal windows.

use std::sync::Arc;

use chrono::{DateTime, Duration, Timelike, Utc};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use engagehub_core::traits::clock::Clock;
use engagehub_core::types::action::ActionType;
use engagehub_core::types::id::{AccountId, TweetId};
use engagehub_entity::scheduled::ScheduledAction;

/// Hour-of-day windows (UTC, half-open) with elevated expected engagement.
const PEAK_WINDOWS: [(u32, u32); 2] = [(12, 14), (19, 22)];

/// Relative engagement value of an hour of the day, 0.0 to 1.0.
fn window_score(hour: u32) -> f64 {
    if PEAK_WINDOWS
        .iter()
        .any(|&(start, end)| hour >= start && hour < end)
    {
        1.0
    } else if PEAK_WINDOWS
        .iter()
        .any(|&(start, end)| hour + 1 == start || hour == end)
    {
        // Shoulder hours around a peak still do noticeably better than the
        // rest of the day.
        0.6
    } else {
        0.3
    }
}

/// First instant at or after `now` that falls inside a peak window.
fn next_peak_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let hour = now.hour();
    if PEAK_WINDOWS
        .iter()
        .any(|&(start, end)| hour >= start && hour < end)
    {
        return now;
    }

    let today = now.date_naive();
    for &(start, _) in &PEAK_WINDOWS {
        if hour < start {
            return today
                .and_hms_opt(start, 0, 0)
                .expect("valid window hour")
                .and_utc();
        }
    }
    // Past the last window today; first window tomorrow.
    (today + Duration::days(1))
        .and_hms_opt(PEAK_WINDOWS[0].0, 0, 0)
        .expect("valid window hour")
        .and_utc()
}

/// Queues admitted actions for dispatch inside engagement windows.
///
/// In-memory only: deferred actions have not consumed quota yet, so losing
/// the queue on restart costs nothing but a delay — the next scan rediscovers
/// the candidates.
#[derive(Debug)]
pub struct ActionPlanner {
    clock: Arc<dyn Clock>,
    queue: Mutex<Vec<ScheduledAction>>,
}

impl ActionPlanner {
    /// Create an empty planner.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            queue: Mutex::new(Vec::new()),
        }
    }

    /// Defer one admitted action into the next engagement window.
    ///
    /// An action already inside a window is scheduled immediately with a
    /// short jitter; otherwise it waits for the next window start plus
    /// jitter so deferred actions do not all fire at the window boundary.
    pub async fn defer(&self, account_id: AccountId, tweet_id: TweetId, action: ActionType) {
        let now = self.clock.now();
        let window_start = next_peak_start(now);
        let jitter_seconds = {
            let mut rng = rand::rng();
            rand::Rng::random_range(&mut rng, 0..900)
        };
        let scheduled_time = window_start + Duration::seconds(jitter_seconds);

        let scheduled = ScheduledAction {
            id: Uuid::new_v4(),
            account_id,
            tweet_id,
            action,
            scheduled_time,
            efficiency_score: window_score(scheduled_time.hour()),
            created_at: now,
        };

        debug!(
            id = %scheduled.id,
            account = %scheduled.account_id,
            %action,
            scheduled_time = %scheduled.scheduled_time,
            score = scheduled.efficiency_score,
            "Action deferred"
        );
        self.queue.lock().await.push(scheduled);
    }

    /// Remove and return every action that is due at `now`.
    pub async fn take_due(&self, now: DateTime<Utc>) -> Vec<ScheduledAction> {
        let mut queue = self.queue.lock().await;
        let mut due = Vec::new();
        let mut index = 0;
        while index < queue.len() {
            if queue[index].is_due(now) {
                due.push(queue.swap_remove(index));
            } else {
                index += 1;
            }
        }
        // Highest expected engagement dispatches first.
        due.sort_by(|a, b| {
            b.efficiency_score
                .partial_cmp(&a.efficiency_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        due
    }

    /// Number of queued actions.
    pub async fn pending(&self) -> usize {
        self.queue.lock().await.len()
    }
}
