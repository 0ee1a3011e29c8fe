//! # Channel Handlers
//!
//! Loading and unloading per-channel demo feedback. Loading inserts freshly
//! generated mock items for the channel; unloading removes exactly that
//! channel's items.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::board::lock_board;
use crate::error::ApiError;
use crate::models::{Channel, Company};
use crate::server::AppState;

use super::types::ItemView;

fn parse_channel(raw: &str) -> Result<Channel, ApiError> {
    raw.parse().map_err(|_| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            "VALIDATION_FAILED",
            &format!("Unknown channel: {}", raw),
        )
    })
}

/// Request body for loading a channel
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LoadChannelRequest {
    /// Company the mock items belong to (default: skybound)
    #[serde(default)]
    pub company: Option<Company>,
}

/// Response for a channel load
#[derive(Debug, Serialize, ToSchema)]
pub struct LoadChannelResponse {
    pub channel: Channel,
    pub loaded: usize,
    pub items: Vec<ItemView>,
}

/// Loads mock feedback items for one channel
#[utoipa::path(
    post,
    path = "/channels/{channel}/load",
    params(("channel" = String, Path, description = "Channel slug, e.g. \"email\"")),
    request_body = LoadChannelRequest,
    responses(
        (status = 200, description = "Loaded items", body = LoadChannelResponse),
        (status = 400, description = "Unknown channel", body = ApiError)
    ),
    tag = "channels"
)]
pub async fn load_channel(
    State(state): State<AppState>,
    Path(channel): Path<String>,
    body: Option<Json<LoadChannelRequest>>,
) -> Result<Json<LoadChannelResponse>, ApiError> {
    let channel = parse_channel(&channel)?;
    let company = body
        .and_then(|Json(request)| request.company)
        .unwrap_or(Company::Skybound);

    let now = Utc::now();
    let mut board = lock_board(&state.board);
    let items = board.load_channel(channel, company);
    Ok(Json(LoadChannelResponse {
        channel,
        loaded: items.len(),
        items: items.into_iter().map(|item| ItemView::at(item, now)).collect(),
    }))
}

/// Response for a channel unload
#[derive(Debug, Serialize, ToSchema)]
pub struct UnloadChannelResponse {
    pub channel: Channel,
    pub removed: usize,
}

/// Removes every item loaded from one channel
#[utoipa::path(
    delete,
    path = "/channels/{channel}",
    params(("channel" = String, Path, description = "Channel slug, e.g. \"email\"")),
    responses(
        (status = 200, description = "Removal summary", body = UnloadChannelResponse),
        (status = 400, description = "Unknown channel", body = ApiError)
    ),
    tag = "channels"
)]
pub async fn unload_channel(
    State(state): State<AppState>,
    Path(channel): Path<String>,
) -> Result<Json<UnloadChannelResponse>, ApiError> {
    let channel = parse_channel(&channel)?;
    let mut board = lock_board(&state.board);
    let removed = board.unload_channel(channel);
    Ok(Json(UnloadChannelResponse { channel, removed }))
}
