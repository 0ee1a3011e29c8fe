//! # View Filters & Swimlanes
//!
//! Derived, read-only projections over the item store: attribute filters,
//! free-text search, swimlane grouping and the board/swimlane view-mode
//! toggle. Nothing here mutates state and nothing else consumes these
//! results; they exist for presentation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Channel, Company, FeedbackItem, FeedbackStatus, Priority};

/// How the board is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Board,
    Swimlane,
}

/// Dimension items are grouped by in swimlane view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SwimlaneBy {
    Company,
    Channel,
    Priority,
}

/// Conjunctive item filter; absent fields match everything.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ItemFilter {
    pub company: Option<Company>,
    pub channel: Option<Channel>,
    pub priority: Option<Priority>,
    pub status: Option<FeedbackStatus>,
    /// Case-insensitive match against body, subject and author name.
    pub search: Option<String>,
}

impl ItemFilter {
    pub fn matches(&self, item: &FeedbackItem) -> bool {
        if self.company.is_some_and(|c| c != item.company) {
            return false;
        }
        if self.channel.is_some_and(|c| c != item.channel) {
            return false;
        }
        if self.priority.is_some_and(|p| p != item.priority) {
            return false;
        }
        if self.status.is_some_and(|s| s != item.status) {
            return false;
        }
        if let Some(search) = &self.search
            && !search.trim().is_empty()
        {
            let needle = search.to_lowercase();
            let in_body = item.content.body.to_lowercase().contains(&needle);
            let in_subject = item
                .content
                .subject
                .as_ref()
                .is_some_and(|s| s.to_lowercase().contains(&needle));
            let in_author = item.author.name.to_lowercase().contains(&needle);
            if !(in_body || in_subject || in_author) {
                return false;
            }
        }
        true
    }
}

/// Applies a filter, preserving input order.
pub fn filter_items(items: &[FeedbackItem], filter: &ItemFilter) -> Vec<FeedbackItem> {
    items
        .iter()
        .filter(|item| filter.matches(item))
        .cloned()
        .collect()
}

/// Groups items into swimlanes keyed by the display label of the chosen
/// dimension. Lanes come back in stable (sorted-key) order.
pub fn swimlanes(items: &[FeedbackItem], by: SwimlaneBy) -> BTreeMap<String, Vec<FeedbackItem>> {
    let mut lanes: BTreeMap<String, Vec<FeedbackItem>> = BTreeMap::new();
    for item in items {
        let key = match by {
            SwimlaneBy::Company => item.company.to_string(),
            SwimlaneBy::Channel => item.channel.to_string(),
            SwimlaneBy::Priority => item.priority.to_string(),
        };
        lanes.entry(key).or_default().push(item.clone());
    }
    lanes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::feedback::FeedbackContent;
    use crate::models::AuthorMeta;
    use chrono::Utc;

    fn item(id: &str, company: Company, channel: Channel, priority: Priority) -> FeedbackItem {
        FeedbackItem {
            id: id.to_string(),
            company,
            channel,
            created_at: Utc::now(),
            status: FeedbackStatus::New,
            priority,
            author: AuthorMeta {
                name: "Dana Reviewer".to_string(),
                ..AuthorMeta::default()
            },
            content: FeedbackContent {
                body: "The checkout button does nothing".to_string(),
                subject: Some("Broken checkout".to_string()),
                ..FeedbackContent::default()
            },
            payload: None,
            tags: vec![],
            analysis: None,
            linked: Default::default(),
            resolved_at: None,
            resolved_by: None,
            source: None,
        }
    }

    #[test]
    fn filters_are_conjunctive() {
        let items = vec![
            item("fb-1", Company::Skybound, Channel::Email, Priority::High),
            item("fb-2", Company::Dealspot, Channel::Email, Priority::High),
            item("fb-3", Company::Skybound, Channel::Twitter, Priority::Low),
        ];
        let filter = ItemFilter {
            company: Some(Company::Skybound),
            channel: Some(Channel::Email),
            ..ItemFilter::default()
        };
        let matched = filter_items(&items, &filter);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, "fb-1");
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let items = vec![item(
            "fb-1",
            Company::Skybound,
            Channel::Email,
            Priority::High,
        )];
        for needle in ["CHECKOUT", "broken", "dana"] {
            let filter = ItemFilter {
                search: Some(needle.to_string()),
                ..ItemFilter::default()
            };
            assert_eq!(filter_items(&items, &filter).len(), 1, "needle {needle}");
        }
        let miss = ItemFilter {
            search: Some("refund".to_string()),
            ..ItemFilter::default()
        };
        assert!(filter_items(&items, &miss).is_empty());
    }

    #[test]
    fn swimlanes_group_by_requested_dimension() {
        let items = vec![
            item("fb-1", Company::Skybound, Channel::Email, Priority::High),
            item("fb-2", Company::Dealspot, Channel::Email, Priority::Low),
            item("fb-3", Company::Skybound, Channel::Twitter, Priority::High),
        ];
        let by_company = swimlanes(&items, SwimlaneBy::Company);
        assert_eq!(by_company["skybound"].len(), 2);
        assert_eq!(by_company["dealspot"].len(), 1);

        let by_priority = swimlanes(&items, SwimlaneBy::Priority);
        assert_eq!(by_priority["high"].len(), 2);
        assert_eq!(by_priority["low"].len(), 1);
    }
}
