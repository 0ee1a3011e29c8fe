//! # Item Mutation Handlers
//!
//! Endpoints that mutate single items: drag-style moves, reopen, resolve,
//! priority changes, team assignment, comments, and the selection state.
//! Every status change goes through the board service, which validates it
//! against the transition model and journals the matching activity events.

use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::board::lock_board;
use crate::error::ApiError;
use crate::models::{ActivityEvent, Actor, FeedbackStatus, Priority, Resolver};
use crate::server::AppState;

use super::types::{ItemView, SelectionView};

/// Request body for a drag-style move
#[derive(Debug, Deserialize, ToSchema)]
pub struct MoveRequest {
    /// Target column
    pub target: FeedbackStatus,
}

/// Moves an item along a forward edge of the board
#[utoipa::path(
    post,
    path = "/items/{id}/move",
    params(("id" = String, Path, description = "Feedback item id")),
    request_body = MoveRequest,
    responses(
        (status = 200, description = "Item after the move", body = ItemView),
        (status = 400, description = "Move rejected by the transition model", body = ApiError),
        (status = 404, description = "Unknown item", body = ApiError)
    ),
    tag = "items"
)]
pub async fn move_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<MoveRequest>,
) -> Result<Json<ItemView>, ApiError> {
    let mut board = lock_board(&state.board);
    let item = board.move_item(&id, request.target, Actor::User)?;
    Ok(Json(ItemView::at(item, Utc::now())))
}

/// Reopens a resolved item back into the analyzed column
#[utoipa::path(
    post,
    path = "/items/{id}/reopen",
    params(("id" = String, Path, description = "Feedback item id")),
    responses(
        (status = 200, description = "Item after the reopen", body = ItemView),
        (status = 400, description = "Item is not resolved", body = ApiError),
        (status = 404, description = "Unknown item", body = ApiError)
    ),
    tag = "items"
)]
pub async fn reopen_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ItemView>, ApiError> {
    let mut board = lock_board(&state.board);
    let item = board.reopen(&id, Actor::User)?;
    Ok(Json(ItemView::at(item, Utc::now())))
}

/// Request body for resolving an item
#[derive(Debug, Deserialize, ToSchema)]
pub struct ResolveRequest {
    /// Who gets credited with the resolution
    pub resolver: Resolver,
}

/// Resolves an item from its pipeline column into done
#[utoipa::path(
    post,
    path = "/items/{id}/resolve",
    params(("id" = String, Path, description = "Feedback item id")),
    request_body = ResolveRequest,
    responses(
        (status = 200, description = "Resolved item", body = ItemView),
        (status = 400, description = "Item is not in a pipeline column", body = ApiError),
        (status = 404, description = "Unknown item", body = ApiError)
    ),
    tag = "items"
)]
pub async fn resolve_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ResolveRequest>,
) -> Result<Json<ItemView>, ApiError> {
    let actor = match request.resolver {
        Resolver::Human => Actor::User,
        Resolver::Ai => Actor::Ai,
    };
    let mut board = lock_board(&state.board);
    let item = board.move_item(&id, FeedbackStatus::Done, actor)?;
    Ok(Json(ItemView::at(item, Utc::now())))
}

/// Request body for a priority change
#[derive(Debug, Deserialize, ToSchema)]
pub struct PriorityRequest {
    pub priority: Priority,
}

/// Changes an item's priority
#[utoipa::path(
    post,
    path = "/items/{id}/priority",
    params(("id" = String, Path, description = "Feedback item id")),
    request_body = PriorityRequest,
    responses(
        (status = 200, description = "Item after the change", body = ItemView),
        (status = 404, description = "Unknown item", body = ApiError)
    ),
    tag = "items"
)]
pub async fn set_priority(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<PriorityRequest>,
) -> Result<Json<ItemView>, ApiError> {
    let mut board = lock_board(&state.board);
    let item = board.set_priority(&id, request.priority, Actor::User)?;
    Ok(Json(ItemView::at(item, Utc::now())))
}

/// Request body for a team assignment
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignRequest {
    pub team: String,
}

/// Assigns a development team to an analyzed item
#[utoipa::path(
    post,
    path = "/items/{id}/assign",
    params(("id" = String, Path, description = "Feedback item id")),
    request_body = AssignRequest,
    responses(
        (status = 200, description = "Item after the assignment", body = ItemView),
        (status = 400, description = "Item has no analysis yet", body = ApiError),
        (status = 404, description = "Unknown item", body = ApiError)
    ),
    tag = "items"
)]
pub async fn assign_team(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AssignRequest>,
) -> Result<Json<ItemView>, ApiError> {
    let mut board = lock_board(&state.board);
    let item = board.assign_team(&id, &request.team, Actor::User)?;
    Ok(Json(ItemView::at(item, Utc::now())))
}

/// Request body for a comment
#[derive(Debug, Deserialize, ToSchema)]
pub struct CommentRequest {
    pub text: String,
}

/// Records a comment event against an item
#[utoipa::path(
    post,
    path = "/items/{id}/comments",
    params(("id" = String, Path, description = "Feedback item id")),
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Recorded event", body = ActivityEvent),
        (status = 404, description = "Unknown item", body = ApiError)
    ),
    tag = "activity"
)]
pub async fn add_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CommentRequest>,
) -> Result<Json<ActivityEvent>, ApiError> {
    let mut board = lock_board(&state.board);
    let event = board.add_comment(&id, &request.text, Actor::User)?;
    Ok(Json(event))
}

/// Selection mutation to apply
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum SelectionRequest {
    /// Toggle one id in or out of the selection
    Toggle { id: String },
    /// Replace the selection wholesale
    Replace { ids: Vec<String> },
    /// Clear the selection
    Clear,
    /// Mark one item as mid-drag
    BeginDrag { id: String },
    /// Finish the in-flight drag, if any
    EndDrag,
}

/// Mutates the selection and drag state
#[utoipa::path(
    post,
    path = "/selection",
    request_body = SelectionRequest,
    responses(
        (status = 200, description = "Selection after the mutation", body = SelectionView)
    ),
    tag = "board"
)]
pub async fn update_selection(
    State(state): State<AppState>,
    Json(request): Json<SelectionRequest>,
) -> Result<Json<SelectionView>, ApiError> {
    let mut board = lock_board(&state.board);
    let selection = board.selection_mut();
    match request {
        SelectionRequest::Toggle { id } => {
            selection.toggle(&id);
        }
        SelectionRequest::Replace { ids } => selection.select_many(ids),
        SelectionRequest::Clear => selection.clear(),
        SelectionRequest::BeginDrag { id } => selection.begin_drag(&id),
        SelectionRequest::EndDrag => {
            selection.end_drag();
        }
    }
    Ok(Json(SelectionView::from_state(board.selection())))
}
