//! # Normalized Item Store
//!
//! Authoritative in-memory collection of feedback items, keyed by id, with a
//! secondary index grouping ids by status. Point lookups and updates are
//! O(1); status-grouped reads are O(k) in the bucket size. Every mutation
//! keeps the primary map, the insertion-order list and the status index
//! consistent with each other.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::models::{FeedbackItem, FeedbackStatus};

/// Result of a point mutation on the store.
///
/// Mutating an unknown id is not an error, but it is reported explicitly so
/// callers can tell "nothing to do" apart from a bug producing a wrong id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The item existed and the transform was applied.
    Updated,
    /// No item with that id; the store is unchanged.
    NotFound,
}

impl UpdateOutcome {
    pub fn is_updated(self) -> bool {
        matches!(self, UpdateOutcome::Updated)
    }
}

/// Normalized feedback-item store.
///
/// Invariant: every id in a status bucket exists in the primary map with a
/// matching `status` field, and the buckets partition the full id set.
#[derive(Debug, Default)]
pub struct ItemStore {
    items: HashMap<String, FeedbackItem>,
    /// Insertion order; defines default iteration order.
    order: Vec<String>,
    by_status: HashMap<FeedbackStatus, HashSet<String>>,
    /// Bumped on every mutation; used to invalidate the grouped-read cache.
    revision: u64,
    grouped_cache: Option<(u64, HashMap<FeedbackStatus, Vec<FeedbackItem>>)>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the entire store, rebuilding both indexes from scratch. O(n).
    ///
    /// Later duplicates of an id win, mirroring [`ItemStore::add_items`].
    pub fn set_items(&mut self, items: Vec<FeedbackItem>) {
        self.items.clear();
        self.order.clear();
        self.by_status.clear();
        self.add_items(items);
    }

    /// Inserts items, de-duplicating by id: an id already present is
    /// overwritten in place and keeps its original position in the
    /// insertion order.
    pub fn add_items(&mut self, items: Vec<FeedbackItem>) {
        for item in items {
            match self.items.insert(item.id.clone(), item.clone()) {
                Some(previous) => {
                    debug!(id = %item.id, "overwriting existing item in place");
                    if previous.status != item.status {
                        self.bucket_remove(previous.status, &item.id);
                        self.bucket_insert(item.status, item.id.clone());
                    }
                }
                None => {
                    self.order.push(item.id.clone());
                    self.bucket_insert(item.status, item.id);
                }
            }
        }
        self.touch();
    }

    /// Applies a pure transform to the item with the given id, migrating it
    /// between status buckets if the transform changed its status.
    ///
    /// The transform must not change the item's id; a changed id is discarded
    /// and the original restored.
    pub fn update_item<F>(&mut self, id: &str, f: F) -> UpdateOutcome
    where
        F: FnOnce(FeedbackItem) -> FeedbackItem,
    {
        let Some(current) = self.items.get(id).cloned() else {
            debug!(id, "update requested for unknown item id");
            return UpdateOutcome::NotFound;
        };
        let previous_status = current.status;
        let mut next = f(current);
        if next.id != id {
            debug!(id, attempted = %next.id, "ignoring id change from update transform");
            next.id = id.to_string();
        }
        if next.status != previous_status {
            self.bucket_remove(previous_status, id);
            self.bucket_insert(next.status, id.to_string());
        }
        self.items.insert(id.to_string(), next);
        self.touch();
        UpdateOutcome::Updated
    }

    /// Batched [`ItemStore::update_item`]; touches only the given ids and
    /// returns how many of them existed.
    pub fn update_items<F>(&mut self, ids: &[String], mut f: F) -> usize
    where
        F: FnMut(FeedbackItem) -> FeedbackItem,
    {
        let mut updated = 0;
        for id in ids {
            if self.update_item(id, &mut f).is_updated() {
                updated += 1;
            }
        }
        updated
    }

    /// Deletes an item from the primary map, the order list and its bucket.
    pub fn remove_item(&mut self, id: &str) -> UpdateOutcome {
        let Some(removed) = self.items.remove(id) else {
            debug!(id, "removal requested for unknown item id");
            return UpdateOutcome::NotFound;
        };
        self.order.retain(|existing| existing != id);
        self.bucket_remove(removed.status, id);
        self.touch();
        UpdateOutcome::Updated
    }

    /// Resets to the empty state.
    pub fn clear(&mut self) {
        self.items.clear();
        self.order.clear();
        self.by_status.clear();
        self.touch();
    }

    pub fn get_item(&self, id: &str) -> Option<&FeedbackItem> {
        self.items.get(id)
    }

    pub fn has_item(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items in insertion order. O(n).
    pub fn all_items(&self) -> Vec<FeedbackItem> {
        self.order
            .iter()
            .filter_map(|id| self.items.get(id).cloned())
            .collect()
    }

    /// Items currently in the given status, in insertion order.
    ///
    /// The status index alone would make this O(k), but a `HashSet` bucket
    /// loses insertion order, so the board-wide order list is scanned and
    /// filtered through the bucket instead. O(n) in the total item count;
    /// board sizes here never make that matter.
    pub fn items_by_status(&self, status: FeedbackStatus) -> Vec<FeedbackItem> {
        let Some(bucket) = self.by_status.get(&status) else {
            return Vec::new();
        };
        self.order
            .iter()
            .filter(|id| bucket.contains(id.as_str()))
            .filter_map(|id| self.items.get(id).cloned())
            .collect()
    }

    pub fn count_by_status(&self, status: FeedbackStatus) -> usize {
        self.by_status.get(&status).map_or(0, HashSet::len)
    }

    /// All five status buckets realized at once.
    ///
    /// Memoized against the store revision, so repeated calls without an
    /// intervening mutation are O(1).
    pub fn items_grouped_by_status(&mut self) -> &HashMap<FeedbackStatus, Vec<FeedbackItem>> {
        let fresh = matches!(&self.grouped_cache, Some((rev, _)) if *rev == self.revision);
        if !fresh {
            let mut grouped: HashMap<FeedbackStatus, Vec<FeedbackItem>> = FeedbackStatus::ALL
                .iter()
                .map(|status| (*status, Vec::new()))
                .collect();
            for id in &self.order {
                if let Some(item) = self.items.get(id)
                    && let Some(bucket) = grouped.get_mut(&item.status)
                {
                    bucket.push(item.clone());
                }
            }
            self.grouped_cache = Some((self.revision, grouped));
        }
        &self
            .grouped_cache
            .as_ref()
            .expect("grouped cache populated above")
            .1
    }

    /// Ids of all items loaded from the given channel, in insertion order.
    pub fn ids_for_channel(&self, channel: crate::models::Channel) -> Vec<String> {
        self.order
            .iter()
            .filter(|id| {
                self.items
                    .get(id.as_str())
                    .is_some_and(|item| item.channel == channel)
            })
            .cloned()
            .collect()
    }

    fn bucket_insert(&mut self, status: FeedbackStatus, id: String) {
        self.by_status.entry(status).or_default().insert(id);
    }

    fn bucket_remove(&mut self, status: FeedbackStatus, id: &str) {
        if let Some(bucket) = self.by_status.get_mut(&status) {
            bucket.remove(id);
        }
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Verifies the index-consistency invariant. Test support.
    #[cfg(test)]
    pub(crate) fn check_consistency(&self) {
        let mut seen = 0;
        for (status, bucket) in &self.by_status {
            for id in bucket {
                let item = self
                    .items
                    .get(id)
                    .unwrap_or_else(|| panic!("bucket id {id} missing from primary map"));
                assert_eq!(item.status, *status, "bucket/status mismatch for {id}");
                seen += 1;
            }
        }
        assert_eq!(seen, self.items.len(), "buckets do not partition the id set");
        assert_eq!(self.order.len(), self.items.len(), "order list desynced");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AuthorMeta, Channel, Company, FeedbackItem, FeedbackStatus, Priority,
        feedback::FeedbackContent,
    };
    use chrono::Utc;

    fn item(id: &str, status: FeedbackStatus) -> FeedbackItem {
        FeedbackItem {
            id: id.to_string(),
            company: Company::Skybound,
            channel: Channel::Email,
            created_at: Utc::now(),
            status,
            priority: Priority::Medium,
            author: AuthorMeta {
                name: "Test Author".to_string(),
                ..AuthorMeta::default()
            },
            content: FeedbackContent {
                body: "body".to_string(),
                ..FeedbackContent::default()
            },
            payload: None,
            tags: vec!["checkout".to_string()],
            analysis: None,
            linked: Default::default(),
            resolved_at: None,
            resolved_by: None,
            source: None,
        }
    }

    #[test]
    fn add_then_count_then_batch_update() {
        let mut store = ItemStore::new();
        let items: Vec<_> = (0..5)
            .map(|i| item(&format!("fb-{i}"), FeedbackStatus::New))
            .collect();
        let ids: Vec<String> = items.iter().map(|i| i.id.clone()).collect();
        store.add_items(items);

        assert_eq!(store.count_by_status(FeedbackStatus::New), 5);
        store.check_consistency();

        let updated = store.update_items(&ids, |mut item| {
            item.status = FeedbackStatus::Analyzed;
            item
        });
        assert_eq!(updated, 5);
        assert_eq!(store.count_by_status(FeedbackStatus::New), 0);
        assert_eq!(store.count_by_status(FeedbackStatus::Analyzed), 5);
        store.check_consistency();
    }

    #[test]
    fn update_applies_transform_and_migrates_bucket() {
        let mut store = ItemStore::new();
        store.add_items(vec![item("fb-1", FeedbackStatus::New)]);

        let outcome = store.update_item("fb-1", |mut item| {
            item.status = FeedbackStatus::Analyzed;
            item.priority = Priority::High;
            item
        });
        assert_eq!(outcome, UpdateOutcome::Updated);

        let stored = store.get_item("fb-1").unwrap();
        assert_eq!(stored.status, FeedbackStatus::Analyzed);
        assert_eq!(stored.priority, Priority::High);
        assert_eq!(store.count_by_status(FeedbackStatus::New), 0);
        assert_eq!(store.count_by_status(FeedbackStatus::Analyzed), 1);
        store.check_consistency();
    }

    #[test]
    fn update_unknown_id_is_explicit_noop() {
        let mut store = ItemStore::new();
        store.add_items(vec![item("fb-1", FeedbackStatus::New)]);
        let before = store.all_items();

        let outcome = store.update_item("missing", |mut item| {
            item.status = FeedbackStatus::Done;
            item
        });
        assert_eq!(outcome, UpdateOutcome::NotFound);
        assert_eq!(store.all_items(), before);
        store.check_consistency();
    }

    #[test]
    fn duplicate_add_overwrites_in_place_without_order_desync() {
        let mut store = ItemStore::new();
        store.add_items(vec![
            item("fb-1", FeedbackStatus::New),
            item("fb-2", FeedbackStatus::New),
        ]);

        // Re-adding fb-1 with a different status must not duplicate it in the
        // order list, and must migrate the status bucket.
        store.add_items(vec![item("fb-1", FeedbackStatus::Analyzed)]);

        let all = store.all_items();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "fb-1");
        assert_eq!(all[0].status, FeedbackStatus::Analyzed);
        assert_eq!(store.count_by_status(FeedbackStatus::New), 1);
        assert_eq!(store.count_by_status(FeedbackStatus::Analyzed), 1);
        store.check_consistency();
    }

    #[test]
    fn remove_deletes_from_all_indexes() {
        let mut store = ItemStore::new();
        store.add_items(vec![
            item("fb-1", FeedbackStatus::New),
            item("fb-2", FeedbackStatus::Analyzed),
        ]);

        assert_eq!(store.remove_item("fb-1"), UpdateOutcome::Updated);
        assert_eq!(store.remove_item("fb-1"), UpdateOutcome::NotFound);
        assert!(!store.has_item("fb-1"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.count_by_status(FeedbackStatus::New), 0);
        store.check_consistency();
    }

    #[test]
    fn grouped_read_is_memoized_until_mutation() {
        let mut store = ItemStore::new();
        store.add_items(vec![
            item("fb-1", FeedbackStatus::New),
            item("fb-2", FeedbackStatus::Done),
        ]);

        let first: Vec<String> = store.items_grouped_by_status()[&FeedbackStatus::New]
            .iter()
            .map(|i| i.id.clone())
            .collect();
        let rev = store.revision;
        let _ = store.items_grouped_by_status();
        assert_eq!(store.revision, rev, "read must not bump the revision");
        assert_eq!(first, vec!["fb-1".to_string()]);

        store.update_item("fb-1", |mut item| {
            item.status = FeedbackStatus::Analyzed;
            item
        });
        let grouped = store.items_grouped_by_status();
        assert!(grouped[&FeedbackStatus::New].is_empty());
        assert_eq!(grouped[&FeedbackStatus::Analyzed].len(), 1);
    }

    #[test]
    fn transform_cannot_change_item_id() {
        let mut store = ItemStore::new();
        store.add_items(vec![item("fb-1", FeedbackStatus::New)]);

        store.update_item("fb-1", |mut item| {
            item.id = "fb-other".to_string();
            item
        });
        assert!(store.has_item("fb-1"));
        assert!(!store.has_item("fb-other"));
        store.check_consistency();
    }

    #[test]
    fn set_items_rebuilds_from_scratch() {
        let mut store = ItemStore::new();
        store.add_items(vec![item("fb-1", FeedbackStatus::New)]);
        store.set_items(vec![
            item("fb-9", FeedbackStatus::Manual),
            item("fb-8", FeedbackStatus::Done),
        ]);

        assert!(!store.has_item("fb-1"));
        assert_eq!(store.len(), 2);
        assert_eq!(store.count_by_status(FeedbackStatus::Manual), 1);
        let order: Vec<String> = store.all_items().iter().map(|i| i.id.clone()).collect();
        assert_eq!(order, vec!["fb-9".to_string(), "fb-8".to_string()]);
        store.check_consistency();
    }
}
