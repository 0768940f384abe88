//! HTTP API module
//! 
//! Local control surface for driving and observing the timers.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timers", get(list_handler).post(create_handler))
        .route(
            "/timers/:id",
            get(get_handler)
                .put(edit_handler)
                .patch(update_handler)
                .delete(delete_handler),
        )
        .route("/timers/:id/toggle", post(toggle_handler))
        .route("/timers/:id/start", post(start_handler))
        .route("/timers/:id/pause", post(pause_handler))
        .route("/timers/:id/resume", post(resume_handler))
        .route("/timers/:id/stop", post(stop_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
