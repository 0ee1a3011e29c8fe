//! # Tracker Ticket Handlers
//!
//! Creates a resource in the external tracker matching an item's pipeline
//! column and resolves the item. The move to done is applied optimistically
//! before the tracker call and rolled back if it fails, so a tracker outage
//! never strands an item in a half-linked state.

use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::board::{lock_board, optimistic_update};
use crate::error::ApiError;
use crate::models::{FeedbackStatus, Resolver};
use crate::server::AppState;
use crate::trackers::TrackerError;

use super::types::ItemView;

/// Which tracker backend to create the resource in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TicketKind {
    /// Issue tracker; item must be in the automatic pipeline
    Issue,
    /// Ticketing system; item must be in the manual pipeline
    Ticket,
}

/// Request body for a tracker creation
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTicketRequest {
    pub kind: TicketKind,
}

/// Creates a tracker resource for an item and resolves it
#[utoipa::path(
    post,
    path = "/items/{id}/tickets",
    params(("id" = String, Path, description = "Feedback item id")),
    request_body = CreateTicketRequest,
    responses(
        (status = 200, description = "Item resolved with the created reference linked", body = ItemView),
        (status = 400, description = "Item not in the matching pipeline column", body = ApiError),
        (status = 404, description = "Unknown item", body = ApiError),
        (status = 502, description = "Tracker failure; the optimistic move was rolled back", body = ApiError)
    ),
    tag = "tickets"
)]
pub async fn create_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CreateTicketRequest>,
) -> Result<Json<ItemView>, ApiError> {
    let (expected_status, client) = match request.kind {
        TicketKind::Issue => (FeedbackStatus::Automatic, state.issue_tracker.clone()),
        TicketKind::Ticket => (FeedbackStatus::Manual, state.ticket_system.clone()),
    };

    let (draft, team) = lock_board(&state.board).prepare_ticket(&id, expected_status)?;

    // Optimistic phase: the item shows as resolved while the tracker call is
    // in flight and is restored if the call fails.
    let created: Result<_, TrackerError> = optimistic_update(
        &state.board,
        &id,
        |mut item| {
            item.status = FeedbackStatus::Done;
            item.resolved_at = Some(Utc::now());
            item.resolved_by = Some(Resolver::Ai);
            item
        },
        client.create(&id, &draft, team.as_deref()),
    )
    .await;
    let created = created?;

    let item = lock_board(&state.board).apply_ticket_link(&id, client.kind(), &created)?;
    Ok(Json(ItemView::at(item, Utc::now())))
}
