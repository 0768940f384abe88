//! State management module
//! 
//! This module contains the timer entity, the registry state machine and
//! the session state that schedules countdowns.

pub mod timer;
pub mod registry;
pub mod app_state;

// Re-export main types
pub use timer::{Timer, TimerId, TimerStatus};
pub use registry::{TickOutcome, TimerRegistry, Transition, DEFAULT_TIMER_NAME};
pub use app_state::{AppState, TimerSettings, DEFAULT_HOLD_PERIOD, DEFAULT_TICK_PERIOD};
