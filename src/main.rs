//! Menubar Timers - independent countdown timers for a desk accessory
//! 
//! This is the main entry point for the menubar-timers application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use menubar_timers::{
    api::create_router,
    config::Config,
    services::{request_notification_permission, GatedNotifier, LogNotifier, Notifier, OsascriptNotifier},
    state::AppState,
    utils::shutdown_signal,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("menubar_timers={},tower_http=info", config.log_level()))
        .init();

    info!("Starting menubar-timers v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, default={}min, hold={}s",
          config.host, config.port, config.minutes, config.hold);

    let notifier: Arc<dyn Notifier> = if config.silent {
        Arc::new(LogNotifier)
    } else {
        let gate = Arc::new(GatedNotifier::new(Arc::new(OsascriptNotifier)));

        // Completions before the answer arrives are dropped by the gate
        let permission_gate = Arc::clone(&gate);
        tokio::spawn(async move {
            permission_gate.set_permitted(request_notification_permission().await);
        });
        gate
    };

    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        config.timer_settings(),
        notifier,
    ));

    let app = create_router(Arc::clone(&state));

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Control API running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET    /timers            - List timers");
    info!("  POST   /timers            - Add a timer");
    info!("  PUT    /timers/:id        - Set length (minutes or mm:ss)");
    info!("  PATCH  /timers/:id        - Rename / hover");
    info!("  DELETE /timers/:id        - Delete a timer");
    info!("  POST   /timers/:id/toggle - Start, pause or resume");
    info!("  GET    /health            - Health check");

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    state.shutdown();
    info!("Shutdown complete");
    Ok(())
}
