//! Deferred return from finished to idle

use std::{sync::Weak, time::Duration};
use tokio::time::sleep;
use tracing::debug;

use crate::state::{AppState, TimerId};

/// Wait out the hold period, then let the finished timer become editable
pub async fn reversion_task(state: Weak<AppState>, id: TimerId, epoch: u64, hold: Duration) {
    sleep(hold).await;

    if let Some(state) = state.upgrade() {
        if state.end_hold(id, epoch) {
            debug!("Hold period over for timer {}", id);
        }
    }
}
