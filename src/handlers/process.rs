//! # AI Processing Handlers
//!
//! The two batched AI stages. Each handler validates the batch under the
//! board lock, releases the lock for the network call, then re-locks and
//! applies the results in one state update. Items that moved while the call
//! was in flight are skipped; a failed or cancelled call applies nothing.

use std::path::Path as FsPath;

use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::board::lock_board;
use crate::error::ApiError;
use crate::server::AppState;

/// Request body for both processing stages
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProcessRequest {
    /// Ids of the items to process as one batch
    pub ids: Vec<String>,
}

/// Outcome of a processing batch
#[derive(Debug, Serialize, ToSchema)]
pub struct ProcessResponse {
    /// Ids submitted in the batch
    pub requested: usize,
    /// Ids actually updated; items that moved mid-flight are skipped
    pub applied: Vec<String>,
}

/// Runs AI classification over a batch of new items
#[utoipa::path(
    post,
    path = "/process/classify",
    request_body = ProcessRequest,
    responses(
        (status = 200, description = "Classification applied", body = ProcessResponse),
        (status = 400, description = "Batch rejected before any network I/O", body = ApiError),
        (status = 404, description = "Unknown item in batch", body = ApiError),
        (status = 502, description = "AI provider failure; no state was changed", body = ApiError)
    ),
    tag = "process"
)]
pub async fn classify(
    State(state): State<AppState>,
    Json(request): Json<ProcessRequest>,
) -> Result<Json<ProcessResponse>, ApiError> {
    let items = lock_board(&state.board).prepare_classification(&request.ids)?;

    let results = state
        .orchestrator
        .classify(&items, &state.cancel)
        .await?;

    let applied = lock_board(&state.board).apply_classification(&results);
    info!(
        requested = request.ids.len(),
        applied = applied.len(),
        "classification batch applied"
    );
    Ok(Json(ProcessResponse {
        requested: request.ids.len(),
        applied,
    }))
}

/// Runs AI requirement analysis over a batch of analyzed items
#[utoipa::path(
    post,
    path = "/process/requirements",
    request_body = ProcessRequest,
    responses(
        (status = 200, description = "Requirement outcomes applied", body = ProcessResponse),
        (status = 400, description = "Batch rejected (mixed statuses/companies, capacity, missing reference)", body = ApiError),
        (status = 404, description = "Unknown item in batch", body = ApiError),
        (status = 502, description = "AI provider failure; no state was changed", body = ApiError)
    ),
    tag = "process"
)]
pub async fn analyze_requirements(
    State(state): State<AppState>,
    Json(request): Json<ProcessRequest>,
) -> Result<Json<ProcessResponse>, ApiError> {
    let (items, company) = lock_board(&state.board).prepare_requirements(&request.ids)?;

    let reference_path = FsPath::new(&state.config.source_reference_dir)
        .join(format!("{}.md", company.as_str()));
    let source_reference = tokio::fs::read_to_string(&reference_path)
        .await
        .map_err(|_| {
            ApiError::new(
                StatusCode::BAD_REQUEST,
                "VALIDATION_FAILED",
                &format!(
                    "No source reference for company {}: {}",
                    company,
                    reference_path.display()
                ),
            )
        })?;

    let results = state
        .orchestrator
        .analyze_requirements(&items, &source_reference, &state.cancel)
        .await?;

    let applied = lock_board(&state.board).apply_requirements(&results)?;
    info!(
        requested = request.ids.len(),
        applied = applied.len(),
        company = %company,
        "requirement batch applied"
    );
    Ok(Json(ProcessResponse {
        requested: request.ids.len(),
        applied,
    }))
}
