//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{state::Timer, utils::format_duration};

/// A timer as presented to clients, with its `mm:ss` rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerView {
    #[serde(flatten)]
    pub timer: Timer,
    pub display: String,
    pub editable: bool,
}

impl From<Timer> for TimerView {
    fn from(timer: Timer) -> Self {
        Self {
            display: format_duration(timer.remaining),
            editable: timer.status.is_editable(),
            timer,
        }
    }
}

/// Response for every timer endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer: Option<TimerView>,
    pub timers: Vec<TimerView>,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: &str, message: String, timer: Option<Timer>, timers: Vec<Timer>) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            timer: timer.map(TimerView::from),
            timers: timers.into_iter().map(TimerView::from).collect(),
        }
    }

    /// The request was applied
    pub fn ok(message: String, timer: Option<Timer>, timers: Vec<Timer>) -> Self {
        Self::new("ok", message, timer, timers)
    }

    /// The request was valid but had no effect in the current state
    pub fn ignored(message: String, timer: Option<Timer>, timers: Vec<Timer>) -> Self {
        Self::new("ignored", message, timer, timers)
    }

    /// The request was rejected
    pub fn error(message: String, timer: Option<Timer>, timers: Vec<Timer>) -> Self {
        Self::new("error", message, timer, timers)
    }
}

/// Body of POST /timers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTimerRequest {
    pub name: Option<String>,
    /// Minutes or `mm:ss`; the configured default when absent
    pub input: Option<String>,
}

/// Body of PUT /timers/:id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditTimerRequest {
    pub input: String,
}

/// Body of PATCH /timers/:id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTimerRequest {
    pub name: Option<String>,
    pub hovered: Option<bool>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub uptime: String,
    pub timer_count: usize,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok(uptime: String, timer_count: usize) -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime,
            timer_count,
        }
    }
}
