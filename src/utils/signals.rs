//! Signal handling for graceful shutdown

use futures::stream::StreamExt;
use signal_hook_tokio::Signals;
use tracing::{info, warn};

/// Wait for SIGTERM or SIGINT.
///
/// Falls back to tokio's ctrl-c listener when signal handlers cannot be
/// registered.
pub async fn shutdown_signal() {
    match Signals::new([signal_hook::consts::SIGTERM, signal_hook::consts::SIGINT]) {
        Ok(mut signals) => {
            if let Some(signal) = signals.next().await {
                info!("Received signal: {}", signal);
            }
        }
        Err(e) => {
            warn!("Failed to register signal handlers: {}, listening for ctrl-c only", e);
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for ctrl-c: {}", e);
                futures::future::pending::<()>().await;
            }
        }
    }
}
