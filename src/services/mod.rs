//! External service module
//! 
//! This module contains the completion notifier the timers call into.

pub mod notifier;

// Re-export main types
pub use notifier::*;
