//! # Status Transition Model
//!
//! Encodes the fixed set of valid status-to-status moves on the board and the
//! per-status capacity limits. This is the single source of truth for
//! transition validation: the move endpoint and the AI bulk-apply path both
//! go through [`TransitionModel::can_transition`].

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::FeedbackStatus;

/// Directed edges of the board: (source, target).
///
/// `done -> analyzed` is the reopen edge; it is valid for the explicit reopen
/// action only and is excluded from drag-style moves (see
/// [`TransitionModel::can_transition`] vs [`TransitionModel::can_reopen`]).
const EDGES: &[(FeedbackStatus, FeedbackStatus)] = &[
    (FeedbackStatus::New, FeedbackStatus::Analyzed),
    (FeedbackStatus::Analyzed, FeedbackStatus::Manual),
    (FeedbackStatus::Analyzed, FeedbackStatus::Automatic),
    (FeedbackStatus::Manual, FeedbackStatus::Done),
    (FeedbackStatus::Automatic, FeedbackStatus::Done),
];

/// Outcome of validating a proposed transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TransitionDecision {
    pub allowed: bool,
    /// Human-readable reason when the move is rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl TransitionDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

/// Per-status capacity limits for the processing columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineCapacities {
    pub manual: usize,
    pub automatic: usize,
}

impl Default for PipelineCapacities {
    fn default() -> Self {
        // Demo defaults; overridable through AppConfig.
        Self {
            manual: 10,
            automatic: 5,
        }
    }
}

/// Validates proposed status moves against the board's edge set and the
/// configured pipeline capacities.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionModel {
    capacities: PipelineCapacities,
}

impl TransitionModel {
    pub fn new(capacities: PipelineCapacities) -> Self {
        Self { capacities }
    }

    /// Maximum concurrent items for the given status, if it is capped.
    pub fn capacity(&self, status: FeedbackStatus) -> Option<usize> {
        match status {
            FeedbackStatus::Manual => Some(self.capacities.manual),
            FeedbackStatus::Automatic => Some(self.capacities.automatic),
            _ => None,
        }
    }

    /// Validates a forward move of one item from `source` to `target`, given
    /// the number of items currently in `target`.
    ///
    /// Checks run in a fixed order: no-op, edge membership, capacity.
    pub fn can_transition(
        &self,
        source: FeedbackStatus,
        target: FeedbackStatus,
        current_target_count: usize,
    ) -> TransitionDecision {
        if source == target {
            return TransitionDecision::deny("Item is already in this column");
        }

        if !EDGES.contains(&(source, target)) {
            return TransitionDecision::deny(Self::edge_rejection_reason(source, target));
        }

        if let Some(max) = self.capacity(target)
            && current_target_count >= max
        {
            return TransitionDecision::deny(format!(
                "{} queue is full ({} max)",
                capitalize(target.as_str()),
                max
            ));
        }

        TransitionDecision::allow()
    }

    /// Validates the explicit reopen action (`done -> analyzed`).
    pub fn can_reopen(&self, source: FeedbackStatus) -> TransitionDecision {
        if source == FeedbackStatus::Done {
            TransitionDecision::allow()
        } else {
            TransitionDecision::deny("Only resolved items can be reopened")
        }
    }

    fn edge_rejection_reason(source: FeedbackStatus, target: FeedbackStatus) -> String {
        match (source, target) {
            (FeedbackStatus::New, _) => "Item must be analyzed first".to_string(),
            (FeedbackStatus::Done, _) => "Resolved items cannot be moved".to_string(),
            (FeedbackStatus::Analyzed, FeedbackStatus::Done) => {
                "Cannot skip the processing stage".to_string()
            }
            (FeedbackStatus::Analyzed, FeedbackStatus::New) => {
                "Items cannot return to new".to_string()
            }
            (FeedbackStatus::Manual | FeedbackStatus::Automatic, _) => format!(
                "Items in {} processing can only move to done",
                source.as_str()
            ),
            (source, target) => format!(
                "Cannot move from {} to {}",
                source.as_str(),
                target.as_str()
            ),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeedbackStatus::*;

    #[test]
    fn allows_exactly_the_edge_set_under_capacity() {
        let model = TransitionModel::default();
        for &source in crate::models::FeedbackStatus::ALL {
            for &target in crate::models::FeedbackStatus::ALL {
                let decision = model.can_transition(source, target, 0);
                let expected = source != target && EDGES.contains(&(source, target));
                assert_eq!(
                    decision.allowed, expected,
                    "unexpected decision for {source:?} -> {target:?}"
                );
            }
        }
    }

    #[test]
    fn noop_move_is_rejected() {
        let model = TransitionModel::default();
        let decision = model.can_transition(Analyzed, Analyzed, 0);
        assert!(!decision.allowed);
        assert_eq!(decision.reason.as_deref(), Some("Item is already in this column"));
    }

    #[test]
    fn new_cannot_skip_to_done() {
        let model = TransitionModel::default();
        let decision = model.can_transition(New, Done, 0);
        assert!(!decision.allowed);
        assert_eq!(decision.reason.as_deref(), Some("Item must be analyzed first"));
    }

    #[test]
    fn resolved_items_cannot_be_dragged() {
        let model = TransitionModel::default();
        let decision = model.can_transition(Done, Manual, 0);
        assert!(!decision.allowed);
        assert_eq!(decision.reason.as_deref(), Some("Resolved items cannot be moved"));
    }

    #[test]
    fn manual_queue_at_cap_rejects_with_message() {
        let model = TransitionModel::default();
        let decision = model.can_transition(Analyzed, Manual, 10);
        assert!(!decision.allowed);
        assert_eq!(
            decision.reason.as_deref(),
            Some("Manual queue is full (10 max)")
        );

        // A concurrent move into automatic is unaffected by manual's capacity.
        assert!(model.can_transition(Analyzed, Automatic, 0).allowed);
    }

    #[test]
    fn automatic_queue_uses_its_own_cap() {
        let model = TransitionModel::new(PipelineCapacities {
            manual: 10,
            automatic: 5,
        });
        assert!(model.can_transition(Analyzed, Automatic, 4).allowed);
        let decision = model.can_transition(Analyzed, Automatic, 5);
        assert!(!decision.allowed);
        assert_eq!(
            decision.reason.as_deref(),
            Some("Automatic queue is full (5 max)")
        );
    }

    #[test]
    fn reopen_is_its_own_action() {
        let model = TransitionModel::default();
        assert!(model.can_reopen(Done).allowed);
        assert!(!model.can_reopen(Analyzed).allowed);
        // The reopen edge is not a drag-and-drop transition.
        assert!(!model.can_transition(Done, Analyzed, 0).allowed);
    }

    #[test]
    fn uncapped_columns_ignore_counts() {
        let model = TransitionModel::default();
        assert!(model.can_transition(New, Analyzed, 10_000).allowed);
        assert!(model.can_transition(Manual, Done, 10_000).allowed);
    }
}
