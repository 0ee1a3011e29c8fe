//! # Selection & Drag State
//!
//! Tracks which items are selected for batch actions and which single item is
//! mid-drag. Independent of the item store; holding an id here does not imply
//! the item still exists, so readers re-validate against the store.

use std::collections::HashSet;

/// Multi-select set plus the single in-flight drag, if any.
#[derive(Debug, Default)]
pub struct SelectionState {
    selected: HashSet<String>,
    dragging: Option<String>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles one id in the selection (secondary-click behavior). Returns
    /// whether the id is selected afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.to_string());
            true
        }
    }

    /// Replaces the selection wholesale.
    pub fn select_many(&mut self, ids: impl IntoIterator<Item = String>) {
        self.selected = ids.into_iter().collect();
    }

    pub fn deselect(&mut self, id: &str) {
        self.selected.remove(id);
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Selected ids in arbitrary order.
    pub fn selected_ids(&self) -> Vec<String> {
        self.selected.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Marks one item as mid-drag, replacing any previous drag.
    pub fn begin_drag(&mut self, id: &str) {
        self.dragging = Some(id.to_string());
    }

    pub fn end_drag(&mut self) -> Option<String> {
        self.dragging.take()
    }

    pub fn dragging(&self) -> Option<&str> {
        self.dragging.as_deref()
    }
}
