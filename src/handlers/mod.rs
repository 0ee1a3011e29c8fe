//! # API Handlers
//!
//! This module contains all the HTTP endpoint handlers for the triage board
//! API, grouped by resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;

use crate::board::lock_board;
use crate::models::ServiceInfo;
use crate::server::AppState;

pub mod board;
pub mod channels;
pub mod items;
pub mod process;
pub mod tickets;
pub mod types;

/// Root handler that returns basic service information
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    ),
    tag = "root"
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}

/// Resets the whole board: items, activity log, selection
#[utoipa::path(
    post,
    path = "/reset",
    responses(
        (status = 204, description = "Board reset")
    ),
    tag = "board"
)]
pub async fn reset(State(state): State<AppState>) -> StatusCode {
    lock_board(&state.board).reset();
    StatusCode::NO_CONTENT
}
