//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{info, warn};

use crate::{
    state::{AppState, TimerId, Transition},
    utils::parse_duration,
};
use super::responses::{
    ApiResponse, CreateTimerRequest, EditTimerRequest, HealthResponse, UpdateTimerRequest,
};

/// Error half of every timer handler
pub type ApiError = (StatusCode, Json<ApiResponse>);

type ApiResult = Result<Json<ApiResponse>, ApiError>;

fn reject(state: &AppState, code: StatusCode, id: Option<TimerId>, message: String) -> ApiError {
    warn!("{}", message);
    let timer = id.and_then(|id| state.get(id));
    (code, Json(ApiResponse::error(message, timer, state.timers())))
}

fn not_found(state: &AppState, id: TimerId) -> ApiError {
    reject(state, StatusCode::NOT_FOUND, None, format!("Timer {} not found", id))
}

fn ok(state: &AppState, id: TimerId, message: String) -> ApiResult {
    Ok(Json(ApiResponse::ok(message, state.get(id), state.timers())))
}

/// Turn a refused transition into 404 or 409 depending on whether the timer exists
fn refused(state: &AppState, id: TimerId, action: &str) -> ApiError {
    match state.get(id) {
        Some(timer) => reject(
            state,
            StatusCode::CONFLICT,
            Some(id),
            format!("Cannot {} timer {} while {:?}", action, id, timer.status),
        ),
        None => not_found(state, id),
    }
}

/// Handle GET /timers - List timers in display order
pub async fn list_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let timers = state.timers();
    Json(ApiResponse::ok(format!("{} timers", timers.len()), None, timers))
}

/// Handle POST /timers - Add a timer
pub async fn create_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateTimerRequest>,
) -> ApiResult {
    let seconds = match request.input.as_deref() {
        Some(input) => match parse_duration(input) {
            Ok(seconds) => Some(seconds),
            Err(e) => {
                return Err(reject(
                    &state,
                    StatusCode::UNPROCESSABLE_ENTITY,
                    None,
                    format!("Invalid duration {:?}: {}", input, e),
                ))
            }
        },
        None => None,
    };

    let timer = state.create(request.name.as_deref(), seconds);
    info!("Create endpoint called - timer {} added", timer.id);
    Ok(Json(ApiResponse::ok(
        format!("Timer {} created", timer.id),
        Some(timer),
        state.timers(),
    )))
}

/// Handle GET /timers/:id - Single timer
pub async fn get_handler(State(state): State<Arc<AppState>>, Path(id): Path<TimerId>) -> ApiResult {
    match state.get(id) {
        Some(_) => ok(&state, id, format!("Timer {}", id)),
        None => Err(not_found(&state, id)),
    }
}

/// Handle PUT /timers/:id - Set the length from minutes or mm:ss text
pub async fn edit_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TimerId>,
    Json(request): Json<EditTimerRequest>,
) -> ApiResult {
    if state.get(id).is_none() {
        return Err(not_found(&state, id));
    }

    match state.edit_text(id, &request.input) {
        Ok(true) => ok(&state, id, format!("Timer {} set to {}", id, request.input.trim())),
        Ok(false) => Err(refused(&state, id, "edit")),
        Err(e) => Err(reject(
            &state,
            StatusCode::UNPROCESSABLE_ENTITY,
            Some(id),
            format!("Invalid duration {:?}: {}", request.input, e),
        )),
    }
}

/// Handle PATCH /timers/:id - Rename or set the hover flag
pub async fn update_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TimerId>,
    Json(request): Json<UpdateTimerRequest>,
) -> ApiResult {
    if state.get(id).is_none() {
        return Err(not_found(&state, id));
    }

    if let Some(name) = request.name.as_deref() {
        if !state.rename(id, name) {
            return Err(reject(
                &state,
                StatusCode::UNPROCESSABLE_ENTITY,
                Some(id),
                "Timer name must not be blank".to_string(),
            ));
        }
    }
    if let Some(hovered) = request.hovered {
        state.set_hovered(id, hovered);
    }

    ok(&state, id, format!("Timer {} updated", id))
}

/// Handle DELETE /timers/:id - Remove a timer unless it is the last one
pub async fn delete_handler(State(state): State<Arc<AppState>>, Path(id): Path<TimerId>) -> ApiResult {
    if state.delete(id) {
        info!("Delete endpoint called - timer {} removed", id);
        return Ok(Json(ApiResponse::ok(
            format!("Timer {} deleted", id),
            None,
            state.timers(),
        )));
    }

    match state.get(id) {
        Some(_) => Err(reject(
            &state,
            StatusCode::CONFLICT,
            Some(id),
            "The last timer cannot be deleted".to_string(),
        )),
        None => Err(not_found(&state, id)),
    }
}

/// Handle POST /timers/:id/toggle - Start, pause or resume
pub async fn toggle_handler(State(state): State<Arc<AppState>>, Path(id): Path<TimerId>) -> ApiResult {
    let message = match state.toggle(id) {
        Transition::Started => format!("Timer {} started", id),
        Transition::Paused => format!("Timer {} paused", id),
        Transition::Resumed => format!("Timer {} resumed", id),
        Transition::Ignored => {
            return match state.get(id) {
                Some(timer) => Ok(Json(ApiResponse::ignored(
                    format!("Timer {} left {:?}", id, timer.status),
                    Some(timer),
                    state.timers(),
                ))),
                None => Err(not_found(&state, id)),
            };
        }
    };
    ok(&state, id, message)
}

/// Handle POST /timers/:id/start - Start or restart the countdown
pub async fn start_handler(State(state): State<Arc<AppState>>, Path(id): Path<TimerId>) -> ApiResult {
    if state.start(id) {
        ok(&state, id, format!("Timer {} started", id))
    } else {
        Err(refused(&state, id, "start"))
    }
}

/// Handle POST /timers/:id/pause
pub async fn pause_handler(State(state): State<Arc<AppState>>, Path(id): Path<TimerId>) -> ApiResult {
    if state.pause(id) {
        ok(&state, id, format!("Timer {} paused", id))
    } else {
        Err(refused(&state, id, "pause"))
    }
}

/// Handle POST /timers/:id/resume
pub async fn resume_handler(State(state): State<Arc<AppState>>, Path(id): Path<TimerId>) -> ApiResult {
    if state.resume(id) {
        ok(&state, id, format!("Timer {} resumed", id))
    } else {
        Err(refused(&state, id, "resume"))
    }
}

/// Handle POST /timers/:id/stop - Cancel the countdown and show it as finished
pub async fn stop_handler(State(state): State<Arc<AppState>>, Path(id): Path<TimerId>) -> ApiResult {
    if state.stop(id) {
        ok(&state, id, format!("Timer {} stopped", id))
    } else {
        Err(refused(&state, id, "stop"))
    }
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse::ok(state.get_uptime(), state.len()))
}
