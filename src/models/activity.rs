//! Activity event model
//!
//! Immutable audit records describing everything that happened to a feedback
//! item: status moves, AI analyses, ticket links, resolutions, reopenings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

/// Kind of activity event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Created,
    StatusChanged,
    PriorityChanged,
    Assigned,
    Analyzed,
    CommentAdded,
    TicketLinked,
    Resolved,
    Reopened,
}

/// Who performed the action recorded by an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    User,
    Ai,
    System,
}

/// Immutable audit record for one action on a feedback item.
///
/// Never mutated after creation; the log it lives in is append-only and
/// capped (see [`crate::activity::ActivityLog`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ActivityEvent {
    /// Synthetic monotonically increasing identifier assigned by the log.
    pub id: u64,
    /// Target feedback item.
    pub feedback_id: String,
    pub kind: ActivityKind,
    pub actor: Actor,
    pub at: DateTime<Utc>,
    /// Kind-specific metadata, e.g. `{"from": "new", "to": "analyzed"}` for
    /// status changes or `{"confidence": 0.92}` for analyses.
    #[serde(default, skip_serializing_if = "JsonValue::is_null")]
    pub meta: JsonValue,
}

/// Event fields supplied by callers; id and timestamp are assigned by the log.
#[derive(Debug, Clone)]
pub struct NewActivityEvent {
    pub feedback_id: String,
    pub kind: ActivityKind,
    pub actor: Actor,
    pub meta: JsonValue,
}

impl NewActivityEvent {
    pub fn new(feedback_id: impl Into<String>, kind: ActivityKind, actor: Actor) -> Self {
        Self {
            feedback_id: feedback_id.into(),
            kind,
            actor,
            meta: JsonValue::Null,
        }
    }

    pub fn with_meta(mut self, meta: JsonValue) -> Self {
        self.meta = meta;
        self
    }
}
