//! Timer entity and its status

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier handed out by the registry; never reused within a session.
pub type TimerId = u64;

/// Lifecycle status of a single countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
    Finished,
}

impl TimerStatus {
    /// Input field may be edited in every state except running
    pub fn is_editable(&self) -> bool {
        !matches!(self, TimerStatus::Running)
    }
}

/// One countdown timer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    pub id: TimerId,
    pub name: String,
    pub status: TimerStatus,
    /// Seconds left, never negative
    pub remaining: f64,
    /// Run length captured at the last start, reported on completion
    pub duration: f64,
    /// Pointer-hover flag owned by the presentation layer
    pub hovered: bool,
    pub created_at: DateTime<Utc>,
}

impl Timer {
    /// Create an idle timer with `remaining == duration == initial_seconds`
    pub fn new(id: TimerId, name: String, initial_seconds: f64) -> Self {
        let initial_seconds = initial_seconds.max(0.0);
        Self {
            id,
            name,
            status: TimerStatus::Idle,
            remaining: initial_seconds,
            duration: initial_seconds,
            hovered: false,
            created_at: Utc::now(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    pub fn has_time_left(&self) -> bool {
        self.remaining > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_timer_is_idle_with_matching_duration() {
        let timer = Timer::new(1, "tea".to_string(), 180.0);
        assert_eq!(timer.status, TimerStatus::Idle);
        assert_eq!(timer.remaining, 180.0);
        assert_eq!(timer.duration, 180.0);
        assert!(!timer.hovered);
    }

    #[test]
    fn negative_initial_value_is_clamped() {
        let timer = Timer::new(1, "x".to_string(), -5.0);
        assert_eq!(timer.remaining, 0.0);
        assert!(!timer.has_time_left());
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&TimerStatus::Finished).unwrap();
        assert_eq!(json, "\"finished\"");
    }
}
