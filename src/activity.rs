//! # Activity Log
//!
//! Append-only, capped journal of [`ActivityEvent`]s. Events are prepended
//! (newest first) and the log keeps at most the 500 most recent; older events
//! are evicted. Process-scoped, cleared only by an explicit reset.

use std::collections::VecDeque;

use chrono::Utc;

use crate::models::activity::{ActivityEvent, ActivityKind, Actor, NewActivityEvent};

/// Maximum number of events retained; oldest evicted first.
pub const MAX_EVENTS: usize = 500;

/// Conjunctive filter over the log. An empty/absent predicate matches
/// everything.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub kinds: Option<Vec<ActivityKind>>,
    pub actors: Option<Vec<Actor>>,
    pub feedback_ids: Option<Vec<String>>,
}

/// Capped, append-only event journal.
#[derive(Debug, Default)]
pub struct ActivityLog {
    /// Newest first.
    events: VecDeque<ActivityEvent>,
    next_id: u64,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns a monotonically increasing id and the current timestamp,
    /// prepends the event, and truncates to the most recent [`MAX_EVENTS`].
    pub fn add_event(&mut self, event: NewActivityEvent) -> ActivityEvent {
        self.next_id += 1;
        let event = ActivityEvent {
            id: self.next_id,
            feedback_id: event.feedback_id,
            kind: event.kind,
            actor: event.actor,
            at: Utc::now(),
            meta: event.meta,
        };
        self.events.push_front(event.clone());
        self.events.truncate(MAX_EVENTS);
        event
    }

    /// All events targeting the given feedback item, newest first.
    pub fn item_events(&self, feedback_id: &str) -> Vec<ActivityEvent> {
        self.events
            .iter()
            .filter(|event| event.feedback_id == feedback_id)
            .cloned()
            .collect()
    }

    /// Applies all provided predicates conjunctively, newest first.
    pub fn filter_events(&self, filter: &EventFilter) -> Vec<ActivityEvent> {
        self.events
            .iter()
            .filter(|event| {
                filter
                    .kinds
                    .as_ref()
                    .is_none_or(|kinds| kinds.contains(&event.kind))
                    && filter
                        .actors
                        .as_ref()
                        .is_none_or(|actors| actors.contains(&event.actor))
                    && filter
                        .feedback_ids
                        .as_ref()
                        .is_none_or(|ids| ids.iter().any(|id| id == &event.feedback_id))
            })
            .cloned()
            .collect()
    }

    /// All retained events, newest first.
    pub fn all_events(&self) -> Vec<ActivityEvent> {
        self.events.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drops all retained events. Id assignment keeps counting up so event
    /// ids stay unique across resets.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
