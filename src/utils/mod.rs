//! Utility functions module
//! 
//! This module contains utility functions used throughout the application.

pub mod duration;
pub mod signals;

// Re-export main functions
pub use duration::{format_duration, parse_duration};
pub use signals::shutdown_signal;
