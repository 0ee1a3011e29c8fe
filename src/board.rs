//! # Board Service
//!
//! Command layer over the board's mutable state. Owns the item store, the
//! activity log and the selection state, and funnels every mutation through
//! the transition model so drag moves, menu actions and AI bulk-applies all
//! validate identically. One instance lives behind a single lock in the app
//! state; handlers run each command to completion while holding it, which
//! keeps mutation single-writer.

use std::future::Future;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::activity::{ActivityLog, EventFilter};
use crate::ai::orchestrator::{ClassificationResult, RequirementResult};
use crate::dataset::DatasetFeedbackItem;
use crate::models::{
    ActivityEvent, ActivityKind, Actor, AnalysisResult, Channel, Company, FeedbackItem,
    FeedbackStatus, Pipeline, Priority, Resolver, TicketDraft,
    activity::NewActivityEvent,
};
use crate::selection::SelectionState;
use crate::store::{ItemStore, UpdateOutcome};
use crate::trackers::CreatedTicket;
use crate::transitions::TransitionModel;

/// Errors surfaced by board commands.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("feedback item {0} not found")]
    NotFound(String),
    #[error("{0}")]
    InvalidTransition(String),
    #[error("{0}")]
    Validation(String),
}

/// Mutable board state plus the rules that govern it.
#[derive(Debug, Default)]
pub struct BoardService {
    store: ItemStore,
    activity: ActivityLog,
    selection: SelectionState,
    transitions: TransitionModel,
}

impl BoardService {
    pub fn new(transitions: TransitionModel) -> Self {
        Self {
            store: ItemStore::new(),
            activity: ActivityLog::new(),
            selection: SelectionState::new(),
            transitions,
        }
    }

    pub fn store(&self) -> &ItemStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ItemStore {
        &mut self.store
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionState {
        &mut self.selection
    }

    pub fn transitions(&self) -> &TransitionModel {
        &self.transitions
    }

    /// Loads mock feedback for a channel, recording a created event per item.
    pub fn load_channel(&mut self, channel: Channel, company: Company) -> Vec<FeedbackItem> {
        let items = crate::seeds::mock_channel_items(channel, company);
        for item in &items {
            self.activity.add_event(
                NewActivityEvent::new(&item.id, ActivityKind::Created, Actor::System)
                    .with_meta(json!({"channel": channel.as_str()})),
            );
        }
        self.store.add_items(items.clone());
        info!(channel = %channel, count = items.len(), "loaded channel mock data");
        items
    }

    /// Removes every item loaded from the given channel. Selection entries
    /// for removed items are dropped too.
    pub fn unload_channel(&mut self, channel: Channel) -> usize {
        let ids = self.store.ids_for_channel(channel);
        for id in &ids {
            self.store.remove_item(id);
            self.selection.deselect(id);
        }
        info!(channel = %channel, count = ids.len(), "unloaded channel");
        ids.len()
    }

    /// Imports dataset records, recording a created event per item.
    /// Duplicated ids overwrite in place per the store's dedup rule.
    pub fn import_dataset(&mut self, records: &[DatasetFeedbackItem]) -> usize {
        let items: Vec<FeedbackItem> = records.iter().map(crate::dataset::to_feedback_item).collect();
        for item in &items {
            self.activity.add_event(
                NewActivityEvent::new(&item.id, ActivityKind::Created, Actor::System)
                    .with_meta(json!({"source": "dataset"})),
            );
        }
        let count = items.len();
        self.store.add_items(items);
        count
    }

    /// Moves one item along a forward edge of the board.
    ///
    /// Reaching `done` through a move records the resolution (human for user
    /// actors, ai otherwise).
    pub fn move_item(
        &mut self,
        id: &str,
        target: FeedbackStatus,
        actor: Actor,
    ) -> Result<FeedbackItem, BoardError> {
        let item = self
            .store
            .get_item(id)
            .cloned()
            .ok_or_else(|| BoardError::NotFound(id.to_string()))?;
        let source = item.status;

        let decision =
            self.transitions
                .can_transition(source, target, self.store.count_by_status(target));
        if !decision.allowed {
            return Err(BoardError::InvalidTransition(
                decision.reason.unwrap_or_else(|| "Move not allowed".to_string()),
            ));
        }

        self.store.update_item(id, |mut item| {
            item.status = target;
            if target == FeedbackStatus::Done {
                item.resolved_at = Some(Utc::now());
                item.resolved_by = Some(match actor {
                    Actor::User => Resolver::Human,
                    Actor::Ai | Actor::System => Resolver::Ai,
                });
            }
            item
        });

        self.activity.add_event(
            NewActivityEvent::new(id, ActivityKind::StatusChanged, actor)
                .with_meta(json!({"from": source.as_str(), "to": target.as_str()})),
        );
        if target == FeedbackStatus::Done {
            self.activity
                .add_event(NewActivityEvent::new(id, ActivityKind::Resolved, actor));
        }

        self.store
            .get_item(id)
            .cloned()
            .ok_or_else(|| BoardError::NotFound(id.to_string()))
    }

    /// Explicit reopen action: `done -> analyzed`, clearing the resolution.
    pub fn reopen(&mut self, id: &str, actor: Actor) -> Result<FeedbackItem, BoardError> {
        let item = self
            .store
            .get_item(id)
            .cloned()
            .ok_or_else(|| BoardError::NotFound(id.to_string()))?;

        let decision = self.transitions.can_reopen(item.status);
        if !decision.allowed {
            return Err(BoardError::InvalidTransition(
                decision.reason.unwrap_or_else(|| "Reopen not allowed".to_string()),
            ));
        }

        self.store.update_item(id, |mut item| {
            item.status = FeedbackStatus::Analyzed;
            item.resolved_at = None;
            item.resolved_by = None;
            item
        });
        self.activity.add_event(
            NewActivityEvent::new(id, ActivityKind::Reopened, actor)
                .with_meta(json!({"from": "done", "to": "analyzed"})),
        );

        self.store
            .get_item(id)
            .cloned()
            .ok_or_else(|| BoardError::NotFound(id.to_string()))
    }

    /// Changes an item's priority, recording the old and new values.
    pub fn set_priority(
        &mut self,
        id: &str,
        priority: Priority,
        actor: Actor,
    ) -> Result<FeedbackItem, BoardError> {
        let previous = self
            .store
            .get_item(id)
            .map(|item| item.priority)
            .ok_or_else(|| BoardError::NotFound(id.to_string()))?;

        self.store.update_item(id, |mut item| {
            item.priority = priority;
            item
        });
        if previous != priority {
            self.activity.add_event(
                NewActivityEvent::new(id, ActivityKind::PriorityChanged, actor)
                    .with_meta(json!({"from": previous.as_str(), "to": priority.as_str()})),
            );
        }
        self.store
            .get_item(id)
            .cloned()
            .ok_or_else(|| BoardError::NotFound(id.to_string()))
    }

    /// Assigns a development team, recording an assignment event. The team
    /// lands on the analysis payload, so the item must already be analyzed.
    pub fn assign_team(
        &mut self,
        id: &str,
        team: &str,
        actor: Actor,
    ) -> Result<FeedbackItem, BoardError> {
        let item = self
            .store
            .get_item(id)
            .ok_or_else(|| BoardError::NotFound(id.to_string()))?;
        if item.analysis.is_none() {
            return Err(BoardError::Validation(
                "Item must be analyzed before a team can be assigned".to_string(),
            ));
        }

        let team = team.to_string();
        self.store.update_item(id, |mut item| {
            if let Some(analysis) = item.analysis.as_mut() {
                analysis.assigned_team = Some(team.clone());
            }
            item
        });
        self.activity.add_event(
            NewActivityEvent::new(id, ActivityKind::Assigned, actor)
                .with_meta(json!({"team": team})),
        );
        self.store
            .get_item(id)
            .cloned()
            .ok_or_else(|| BoardError::NotFound(id.to_string()))
    }

    /// Records a free-form comment event against an item.
    pub fn add_comment(
        &mut self,
        id: &str,
        text: &str,
        actor: Actor,
    ) -> Result<ActivityEvent, BoardError> {
        if !self.store.has_item(id) {
            return Err(BoardError::NotFound(id.to_string()));
        }
        Ok(self.activity.add_event(
            NewActivityEvent::new(id, ActivityKind::CommentAdded, actor)
                .with_meta(json!({"text": text})),
        ))
    }

    /// Validates a classification batch before any network I/O: ids must be
    /// non-empty, known, and all in `new`.
    pub fn prepare_classification(&self, ids: &[String]) -> Result<Vec<FeedbackItem>, BoardError> {
        let items = self.collect_items(ids)?;
        if let Some(offender) = items
            .iter()
            .find(|item| item.status != FeedbackStatus::New)
        {
            return Err(BoardError::Validation(format!(
                "Classification accepts only new items; {} is {}",
                offender.id, offender.status
            )));
        }
        Ok(items)
    }

    /// Applies classification results as one state update: each matched item
    /// still in `new` moves to `analyzed` with the analysis attached.
    /// Returns the ids actually updated.
    pub fn apply_classification(&mut self, results: &[ClassificationResult]) -> Vec<String> {
        let mut applied = Vec::new();
        for result in results {
            let Some(current) = self.store.get_item(&result.id) else {
                warn!(id = %result.id, "classification result for unknown item");
                continue;
            };
            if current.status != FeedbackStatus::New {
                warn!(id = %result.id, status = %current.status, "item moved during classification; skipping");
                continue;
            }

            let analysis = AnalysisResult {
                classification: result.classification,
                sentiment: result.sentiment.unwrap_or(crate::models::Sentiment::Neutral),
                suggested_pipeline: result.suggested_pipeline,
                confidence: result.confidence,
                recommended_priority: result.recommended_priority,
                reply: result.reply.clone(),
                ticket_draft: result.ticket_draft.clone(),
                assigned_team: result.assigned_team.clone(),
                reasoning: result.reasoning.clone(),
            };
            let outcome = self.store.update_item(&result.id, |mut item| {
                item.status = FeedbackStatus::Analyzed;
                item.analysis = Some(analysis.clone());
                item
            });
            if outcome == UpdateOutcome::Updated {
                self.activity.add_event(
                    NewActivityEvent::new(&result.id, ActivityKind::Analyzed, Actor::Ai)
                        .with_meta(json!({"confidence": result.confidence})),
                );
                self.activity.add_event(
                    NewActivityEvent::new(&result.id, ActivityKind::StatusChanged, Actor::Ai)
                        .with_meta(json!({"from": "new", "to": "analyzed"})),
                );
                applied.push(result.id.clone());
            }
        }
        applied
    }

    /// Validates a requirement-analysis batch before any network I/O: ids
    /// non-empty and known, all in `analyzed`, all from one company.
    pub fn prepare_requirements(
        &self,
        ids: &[String],
    ) -> Result<(Vec<FeedbackItem>, Company), BoardError> {
        let items = self.collect_items(ids)?;
        if let Some(offender) = items
            .iter()
            .find(|item| item.status != FeedbackStatus::Analyzed)
        {
            return Err(BoardError::Validation(format!(
                "Requirement analysis accepts only analyzed items; {} is {}",
                offender.id, offender.status
            )));
        }
        let company = items[0].company;
        if items.iter().any(|item| item.company != company) {
            return Err(BoardError::Validation(
                "Requirement analysis batches must belong to a single company".to_string(),
            ));
        }
        Ok((items, company))
    }

    /// Applies requirement results atomically: every move is validated
    /// against the transition model (including projected capacity) before
    /// any item changes, so a batch that would overflow a queue is rejected
    /// whole.
    pub fn apply_requirements(
        &mut self,
        results: &[RequirementResult],
    ) -> Result<Vec<String>, BoardError> {
        let mut manual_count = self.store.count_by_status(FeedbackStatus::Manual);
        let mut automatic_count = self.store.count_by_status(FeedbackStatus::Automatic);

        // Validation pass; nothing is mutated until every move checks out.
        let mut moves = Vec::new();
        for result in results {
            let Some(current) = self.store.get_item(&result.id) else {
                warn!(id = %result.id, "requirement result for unknown item");
                continue;
            };
            if current.status != FeedbackStatus::Analyzed {
                warn!(id = %result.id, status = %current.status, "item moved during requirement analysis; skipping");
                continue;
            }
            let target = match result.outcome {
                Pipeline::Manual => FeedbackStatus::Manual,
                Pipeline::Automatic => FeedbackStatus::Automatic,
            };
            let count = match target {
                FeedbackStatus::Manual => &mut manual_count,
                _ => &mut automatic_count,
            };
            let decision = self
                .transitions
                .can_transition(FeedbackStatus::Analyzed, target, *count);
            if !decision.allowed {
                return Err(BoardError::InvalidTransition(
                    decision.reason.unwrap_or_else(|| "Move not allowed".to_string()),
                ));
            }
            *count += 1;
            moves.push((result.clone(), target));
        }

        let mut applied = Vec::new();
        for (result, target) in moves {
            self.store.update_item(&result.id, |mut item| {
                item.status = target;
                if let Some(analysis) = item.analysis.as_mut() {
                    analysis.suggested_pipeline = result.outcome;
                    if let Some(draft) = result.issue_draft.clone().or(result.ticket_draft.clone())
                    {
                        analysis.ticket_draft = Some(draft);
                    }
                    if let Some(reasoning) = result.reasoning.clone() {
                        analysis.reasoning = Some(reasoning);
                    }
                }
                item
            });
            self.activity.add_event(
                NewActivityEvent::new(&result.id, ActivityKind::StatusChanged, Actor::Ai)
                    .with_meta(json!({"from": "analyzed", "to": target.as_str()})),
            );
            applied.push(result.id.clone());
        }
        Ok(applied)
    }

    /// Validates a tracker creation and returns the draft to submit. The
    /// item must sit in the pipeline column matching the tracker kind.
    pub fn prepare_ticket(
        &self,
        id: &str,
        expected_status: FeedbackStatus,
    ) -> Result<(TicketDraft, Option<String>), BoardError> {
        let item = self
            .store
            .get_item(id)
            .ok_or_else(|| BoardError::NotFound(id.to_string()))?;
        if item.status != expected_status {
            return Err(BoardError::Validation(format!(
                "Item {} is in {}, expected {}",
                id, item.status, expected_status
            )));
        }
        let analysis = item.analysis.as_ref().ok_or_else(|| {
            BoardError::Validation(format!("Item {} has no analysis to draft a ticket from", id))
        })?;
        let draft = analysis.ticket_draft.clone().unwrap_or_else(|| TicketDraft {
            summary: item
                .content
                .subject
                .clone()
                .unwrap_or_else(|| crate::ai::extract::truncate_chars(&item.content.body, 80)),
            description: item.content.body.clone(),
            technical_area: None,
            severity: Some(item.priority.to_string()),
            effort: None,
        });
        Ok((draft, analysis.assigned_team.clone()))
    }

    /// Records a successful tracker creation: links the reference and moves
    /// the item to `done` as an AI resolution.
    pub fn apply_ticket_link(
        &mut self,
        id: &str,
        kind: &'static str,
        created: &CreatedTicket,
    ) -> Result<FeedbackItem, BoardError> {
        let outcome = self.store.update_item(id, |mut item| {
            match kind {
                "issue-tracker" => item.linked.issue_key = Some(created.reference.clone()),
                _ => item.linked.ticket_id = Some(created.reference.clone()),
            }
            item.status = FeedbackStatus::Done;
            item.resolved_at = Some(Utc::now());
            item.resolved_by = Some(Resolver::Ai);
            item
        });
        if outcome == UpdateOutcome::NotFound {
            return Err(BoardError::NotFound(id.to_string()));
        }
        self.activity.add_event(
            NewActivityEvent::new(id, ActivityKind::TicketLinked, Actor::Ai).with_meta(json!({
                "tracker": kind,
                "reference": created.reference,
                "url": created.url,
            })),
        );
        self.activity
            .add_event(NewActivityEvent::new(id, ActivityKind::Resolved, Actor::Ai));
        self.store
            .get_item(id)
            .cloned()
            .ok_or_else(|| BoardError::NotFound(id.to_string()))
    }

    /// Restores an item to a previously captured revision. Rollback arm of
    /// the optimistic-update protocol.
    pub fn restore_item(&mut self, snapshot: FeedbackItem) {
        self.store.add_items(vec![snapshot]);
    }

    pub fn filter_activity(&self, filter: &EventFilter) -> Vec<ActivityEvent> {
        self.activity.filter_events(filter)
    }

    /// Resets the whole board: items, events, selection.
    pub fn reset(&mut self) {
        self.store.clear();
        self.activity.clear();
        self.selection.clear();
        info!("board reset");
    }

    fn collect_items(&self, ids: &[String]) -> Result<Vec<FeedbackItem>, BoardError> {
        if ids.is_empty() {
            return Err(BoardError::Validation("No items selected".to_string()));
        }
        ids.iter()
            .map(|id| {
                self.store
                    .get_item(id)
                    .cloned()
                    .ok_or_else(|| BoardError::NotFound(id.clone()))
            })
            .collect()
    }
}

/// Three-phase optimistic update: snapshot the item, apply a provisional
/// mutation, run the async operation, and restore the snapshot if it fails.
/// The lock is only held for the synchronous phases.
pub async fn optimistic_update<T, E, Apply, Fut>(
    board: &Mutex<BoardService>,
    id: &str,
    apply: Apply,
    operation: Fut,
) -> Result<T, E>
where
    Apply: FnOnce(FeedbackItem) -> FeedbackItem,
    Fut: Future<Output = Result<T, E>>,
{
    let snapshot = {
        let mut guard = lock_board(board);
        let snapshot = guard.store().get_item(id).cloned();
        if snapshot.is_some() {
            guard.store_mut().update_item(id, apply);
        }
        snapshot
    };

    let result = operation.await;
    if result.is_err()
        && let Some(snapshot) = snapshot
    {
        lock_board(board).restore_item(snapshot);
    }
    result
}

/// Locks the board, recovering from poisoning; board state stays usable even
/// if a handler panicked mid-command.
pub fn lock_board(board: &Mutex<BoardService>) -> MutexGuard<'_, BoardService> {
    board
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
