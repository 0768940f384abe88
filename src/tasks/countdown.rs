//! Per-timer countdown task

use std::{sync::Weak, time::Duration};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use crate::state::{AppState, TimerId};

/// Tick a timer once per period until it finishes, is deleted, or a newer
/// countdown replaces this one.
///
/// The first tick lands one full period after the task starts.
pub async fn countdown_task(state: Weak<AppState>, id: TimerId, epoch: u64, period: Duration) {
    debug!("Countdown for timer {} started (epoch {})", id, epoch);

    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let Some(state) = state.upgrade() else {
            break;
        };
        if !state.advance(id, epoch) {
            break;
        }
    }

    debug!("Countdown for timer {} ended (epoch {})", id, epoch);
}
