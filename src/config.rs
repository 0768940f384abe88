//! Configuration and CLI argument handling

use std::time::Duration;
use clap::Parser;

use crate::state::{TimerSettings, DEFAULT_TICK_PERIOD};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "menubar-timers")]
#[command(about = "Independent countdown timers with completion notifications")]
#[command(version)]
pub struct Config {
    /// Port of the local control API
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Length in minutes of the seeded timer and of new timers
    #[arg(short, long, default_value = "5")]
    pub minutes: u64,

    /// Seconds a finished timer is held before it becomes idle again
    #[arg(long, default_value = "10")]
    pub hold: u64,

    /// Log completions instead of raising user notifications
    #[arg(short, long)]
    pub silent: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Timer parameters for the session
    pub fn timer_settings(&self) -> TimerSettings {
        TimerSettings {
            default_seconds: self.minutes.saturating_mul(60) as f64,
            hold_period: Duration::from_secs(self.hold),
            tick_period: DEFAULT_TICK_PERIOD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["menubar-timers"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.log_level(), "info");

        let settings = config.timer_settings();
        assert_eq!(settings.default_seconds, 300.0);
        assert_eq!(settings.hold_period, Duration::from_secs(10));
        assert_eq!(settings.tick_period, Duration::from_secs(1));
    }

    #[test]
    fn huge_minutes_saturate() {
        let minutes = u64::MAX.to_string();
        let config = Config::try_parse_from(["menubar-timers", "-m", minutes.as_str()]).unwrap();
        assert_eq!(config.timer_settings().default_seconds, u64::MAX as f64);
    }

    #[test]
    fn overrides() {
        let config = Config::try_parse_from([
            "menubar-timers", "-p", "9000", "-m", "25", "--hold", "3", "-s", "-v",
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert!(config.silent);
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.timer_settings().default_seconds, 1500.0);
        assert_eq!(config.timer_settings().hold_period, Duration::from_secs(3));
    }
}
