//! Completion alerts raised when a timer runs out

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::utils::format_duration;

/// Title shown on every completion alert
pub const NOTIFICATION_TITLE: &str = "Timer";

/// Receives one call per timer completion.
///
/// Calls are fire-and-forget: implementations must not block and must not
/// report failures back to the registry.
pub trait Notifier: Send + Sync {
    fn notify(&self, duration_seconds: Option<f64>);
}

/// Body text of a completion alert
pub fn completion_message(duration_seconds: Option<f64>) -> String {
    match duration_seconds {
        Some(seconds) => format!("Your {} timer has finished.", format_duration(seconds)),
        None => "Your timer has finished.".to_string(),
    }
}

/// Writes completions to the log only
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, duration_seconds: Option<f64>) {
        info!("{}: {}", NOTIFICATION_TITLE, completion_message(duration_seconds));
    }
}

/// Raises a macOS user notification through `osascript`
#[derive(Debug, Default)]
pub struct OsascriptNotifier;

impl OsascriptNotifier {
    fn script(message: &str) -> String {
        format!(
            "display notification {} with title {}",
            applescript_string(message),
            applescript_string(NOTIFICATION_TITLE)
        )
    }
}

impl Notifier for OsascriptNotifier {
    fn notify(&self, duration_seconds: Option<f64>) {
        let script = Self::script(&completion_message(duration_seconds));

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("No runtime available, dropping completion notification");
            return;
        };

        handle.spawn(async move {
            let output = Command::new("osascript").args(["-e", script.as_str()]).output().await;
            match output {
                Ok(output) if output.status.success() => debug!("Completion notification shown"),
                Ok(output) => {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    warn!("osascript notification failed: {}", stderr.trim());
                }
                Err(e) => warn!("Failed to execute osascript: {}", e),
            }
        });
    }
}

fn applescript_string(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Forwards to an inner notifier only once permission has been granted
pub struct GatedNotifier {
    inner: Arc<dyn Notifier>,
    permitted: AtomicBool,
}

impl GatedNotifier {
    /// Create a gate that starts closed
    pub fn new(inner: Arc<dyn Notifier>) -> Self {
        Self {
            inner,
            permitted: AtomicBool::new(false),
        }
    }

    /// Cache the outcome of a permission request
    pub fn set_permitted(&self, permitted: bool) {
        info!("Notification permission {}", if permitted { "granted" } else { "denied" });
        self.permitted.store(permitted, Ordering::Relaxed);
    }

    pub fn is_permitted(&self) -> bool {
        self.permitted.load(Ordering::Relaxed)
    }
}

impl Notifier for GatedNotifier {
    fn notify(&self, duration_seconds: Option<f64>) {
        if self.is_permitted() {
            self.inner.notify(duration_seconds);
        } else {
            debug!("Notification permission not granted, skipping alert");
        }
    }
}

/// Ask the host whether user notifications can be raised.
///
/// On this platform that amounts to `osascript` being runnable.
pub async fn request_notification_permission() -> bool {
    match Command::new("osascript").args(["-e", "return"]).output().await {
        Ok(output) => output.status.success(),
        Err(e) => {
            debug!("osascript unavailable: {}", e);
            false
        }
    }
}
