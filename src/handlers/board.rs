//! # Board Read Handlers
//!
//! Read-side endpoints: the grouped board snapshot (optionally filtered and
//! regrouped into swimlanes), single-item lookup, and the activity feed.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::activity::EventFilter;
use crate::board::lock_board;
use crate::error::{ApiError, ErrorType};
use crate::models::{
    ActivityEvent, ActivityKind, Actor, Channel, Company, FeedbackStatus, Priority,
};
use crate::server::AppState;
use crate::views::{ItemFilter, SwimlaneBy, ViewMode, filter_items, swimlanes};

use super::types::{ItemView, SelectionView};

/// Query parameters for the board snapshot
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct BoardQuery {
    pub company: Option<Company>,
    pub channel: Option<Channel>,
    pub priority: Option<Priority>,
    /// Case-insensitive search over body, subject and author name
    pub search: Option<String>,
    /// Render mode; swimlane adds the grouped lanes to the response
    pub view: Option<ViewMode>,
    /// Swimlane grouping dimension (default: company)
    pub swimlane_by: Option<SwimlaneBy>,
}

/// One board column with its items and capacity
#[derive(Debug, Serialize, ToSchema)]
pub struct ColumnView {
    pub status: FeedbackStatus,
    /// Items in this column after filtering
    pub count: usize,
    /// Unfiltered occupancy, the number capacity checks run against
    pub occupancy: usize,
    pub capacity: Option<usize>,
    pub items: Vec<ItemView>,
}

/// Full board snapshot
#[derive(Debug, Serialize, ToSchema)]
pub struct BoardResponse {
    pub columns: Vec<ColumnView>,
    pub total: usize,
    pub selection: SelectionView,
    /// How often clients should re-derive SLA badges
    pub sla_refresh_seconds: u64,
    /// Present only when `view=swimlane`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swimlanes: Option<BTreeMap<String, Vec<ItemView>>>,
}

/// Returns the grouped board state with counts and SLA readings
#[utoipa::path(
    get,
    path = "/board",
    params(BoardQuery),
    responses(
        (status = 200, description = "Grouped board snapshot", body = BoardResponse)
    ),
    tag = "board"
)]
pub async fn get_board(
    State(state): State<AppState>,
    Query(query): Query<BoardQuery>,
) -> Result<Json<BoardResponse>, ApiError> {
    let now = Utc::now();
    let filter = ItemFilter {
        company: query.company,
        channel: query.channel,
        priority: query.priority,
        status: None,
        search: query.search.clone(),
    };

    let mut board = lock_board(&state.board);
    let grouped = board.store_mut().items_grouped_by_status().clone();
    let selection = SelectionView::from_state(board.selection());
    let transitions = *board.transitions();
    drop(board);

    let mut columns = Vec::with_capacity(FeedbackStatus::ALL.len());
    let mut total = 0;
    for &status in FeedbackStatus::ALL {
        let bucket = grouped.get(&status).cloned().unwrap_or_default();
        let occupancy = bucket.len();
        let items: Vec<ItemView> = filter_items(&bucket, &filter)
            .into_iter()
            .map(|item| ItemView::at(item, now))
            .collect();
        total += items.len();
        columns.push(ColumnView {
            status,
            count: items.len(),
            occupancy,
            capacity: transitions.capacity(status),
            items,
        });
    }

    let lanes = if query.view == Some(ViewMode::Swimlane) {
        let all: Vec<_> = grouped.into_values().flatten().collect();
        let filtered = filter_items(&all, &filter);
        let by = query.swimlane_by.unwrap_or(SwimlaneBy::Company);
        Some(
            swimlanes(&filtered, by)
                .into_iter()
                .map(|(lane, items)| {
                    (
                        lane,
                        items.into_iter().map(|item| ItemView::at(item, now)).collect(),
                    )
                })
                .collect(),
        )
    } else {
        None
    };

    Ok(Json(BoardResponse {
        columns,
        total,
        selection,
        sla_refresh_seconds: state.config.sla_refresh_seconds,
        swimlanes: lanes,
    }))
}

/// Returns one feedback item with its current SLA reading
#[utoipa::path(
    get,
    path = "/items/{id}",
    params(("id" = String, Path, description = "Feedback item id")),
    responses(
        (status = 200, description = "Feedback item", body = ItemView),
        (status = 404, description = "Unknown item", body = ApiError)
    ),
    tag = "items"
)]
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ItemView>, ApiError> {
    let board = lock_board(&state.board);
    let item = board
        .store()
        .get_item(&id)
        .cloned()
        .ok_or(ErrorType::NotFound)?;
    Ok(Json(ItemView::at(item, Utc::now())))
}

/// Returns the activity feed for one item, newest first
#[utoipa::path(
    get,
    path = "/items/{id}/activity",
    params(("id" = String, Path, description = "Feedback item id")),
    responses(
        (status = 200, description = "Events targeting the item", body = [ActivityEvent]),
        (status = 404, description = "Unknown item", body = ApiError)
    ),
    tag = "activity"
)]
pub async fn get_item_activity(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ActivityEvent>>, ApiError> {
    let board = lock_board(&state.board);
    if !board.store().has_item(&id) {
        return Err(ErrorType::NotFound.into());
    }
    Ok(Json(board.activity().item_events(&id)))
}

/// Query parameters for the global activity feed
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ActivityQuery {
    /// Comma-separated event kinds, e.g. "status_changed,resolved"
    pub kinds: Option<String>,
    /// Comma-separated actors, e.g. "user,ai"
    pub actors: Option<String>,
    /// Comma-separated feedback item ids
    pub ids: Option<String>,
}

fn parse_list<T: serde::de::DeserializeOwned>(raw: &str, field: &str) -> Result<Vec<T>, ApiError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            serde_json::from_value(serde_json::Value::String(part.to_string())).map_err(|_| {
                ApiError::new(
                    axum::http::StatusCode::BAD_REQUEST,
                    "VALIDATION_FAILED",
                    &format!("Unknown {} value: {}", field, part),
                )
            })
        })
        .collect()
}

/// Returns the global activity feed, filtered conjunctively
#[utoipa::path(
    get,
    path = "/activity",
    params(ActivityQuery),
    responses(
        (status = 200, description = "Matching events, newest first", body = [ActivityEvent]),
        (status = 400, description = "Unknown filter value", body = ApiError)
    ),
    tag = "activity"
)]
pub async fn get_activity(
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Vec<ActivityEvent>>, ApiError> {
    let filter = EventFilter {
        kinds: query
            .kinds
            .as_deref()
            .map(|raw| parse_list::<ActivityKind>(raw, "kind"))
            .transpose()?,
        actors: query
            .actors
            .as_deref()
            .map(|raw| parse_list::<Actor>(raw, "actor"))
            .transpose()?,
        feedback_ids: query.ids.as_deref().map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect()
        }),
    };

    let board = lock_board(&state.board);
    Ok(Json(board.filter_activity(&filter)))
}
