//! Background tasks module
//! 
//! Countdown and hold-period tasks spawned per timer by the session state.

pub mod countdown;
pub mod reversion;

// Re-export main functions
pub use countdown::countdown_task;
pub use reversion::reversion_task;
