//! # Common API Types
//!
//! Shared response shapes used across multiple handlers: items enriched with
//! their derived SLA reading, and the selection view returned by every
//! selection mutation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::FeedbackItem;
use crate::selection::SelectionState;
use crate::sla::{SlaInfo, compute_sla};

/// A feedback item together with its SLA reading at response time.
#[derive(Debug, Serialize, ToSchema)]
pub struct ItemView {
    #[serde(flatten)]
    pub item: FeedbackItem,
    /// Derived at read time, never persisted.
    pub sla: SlaInfo,
}

impl ItemView {
    pub fn at(item: FeedbackItem, now: DateTime<Utc>) -> Self {
        let sla = compute_sla(item.created_at, item.channel, item.priority, item.status, now);
        Self { item, sla }
    }
}

/// Current selection and drag state.
#[derive(Debug, Serialize, ToSchema)]
pub struct SelectionView {
    pub selected: Vec<String>,
    pub dragging: Option<String>,
}

impl SelectionView {
    pub fn from_state(state: &SelectionState) -> Self {
        let mut selected = state.selected_ids();
        selected.sort();
        Self {
            selected,
            dragging: state.dragging().map(str::to_string),
        }
    }
}
