//! Menubar Timers - independent countdown timers for a desk accessory
//! 
//! This library provides a session-scoped registry of countdown timers that
//! can be started, paused, resumed, edited and deleted, raising a
//! notification when one runs out.

pub mod config;
pub mod error;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::ParseDurationError;
pub use state::{AppState, Timer, TimerId, TimerStatus};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
