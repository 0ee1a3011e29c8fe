//! Feedback item model
//!
//! One unit of customer feedback flowing through the board, together with the
//! enums describing where it came from and where it sits in the pipeline.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

use super::analysis::AnalysisResult;

/// Originating demo company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Company {
    /// Flight-search storefront demo
    Skybound,
    /// Deals-marketplace storefront demo
    Dealspot,
}

impl Company {
    pub const fn as_str(self) -> &'static str {
        match self {
            Company::Skybound => "skybound",
            Company::Dealspot => "dealspot",
        }
    }
}

impl fmt::Display for Company {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Channel a piece of feedback arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Twitter,
    Facebook,
    LiveChat,
    Trustpilot,
    AppStore,
    Instagram,
}

impl Channel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Twitter => "twitter",
            Channel::Facebook => "facebook",
            Channel::LiveChat => "live_chat",
            Channel::Trustpilot => "trustpilot",
            Channel::AppStore => "app_store",
            Channel::Instagram => "instagram",
        }
    }

    /// All channels the board can load mock data for.
    pub const ALL: &'static [Channel] = &[
        Channel::Email,
        Channel::Twitter,
        Channel::Facebook,
        Channel::LiveChat,
        Channel::Trustpilot,
        Channel::AppStore,
        Channel::Instagram,
    ];
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown channel '{}'", s))
    }
}

/// Pipeline status of a feedback item.
///
/// The allowed movements between statuses are owned by
/// [`crate::transitions::TransitionModel`]; this enum only names the columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackStatus {
    New,
    Analyzed,
    Manual,
    Automatic,
    Done,
}

impl FeedbackStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            FeedbackStatus::New => "new",
            FeedbackStatus::Analyzed => "analyzed",
            FeedbackStatus::Manual => "manual",
            FeedbackStatus::Automatic => "automatic",
            FeedbackStatus::Done => "done",
        }
    }

    /// Board column order, used for grouped reads and display.
    pub const ALL: &'static [FeedbackStatus] = &[
        FeedbackStatus::New,
        FeedbackStatus::Analyzed,
        FeedbackStatus::Manual,
        FeedbackStatus::Automatic,
        FeedbackStatus::Done,
    ];
}

impl fmt::Display for FeedbackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a feedback item, ordered from lowest to highest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who resolved a feedback item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Resolver {
    Human,
    Ai,
}

/// Author metadata attached to a feedback item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuthorMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followers: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

/// Channel-specific payload carried alongside the body text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChannelPayload {
    /// Star rating from a review site or app store (1-5).
    Rating { stars: u8 },
    /// Structured live-chat transcript, ordered oldest first.
    Transcript { messages: Vec<TranscriptMessage> },
    /// Engagement counters from a social platform.
    Engagement { likes: u64, shares: u64, replies: u64 },
    /// Reaction counters from a review or photo-sharing platform.
    Reactions { helpful: u64, unhelpful: u64 },
}

/// One message within a live-chat transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TranscriptMessage {
    /// "customer" or "agent"
    pub speaker: String,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// External tracker references linked to a feedback item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LinkedTickets {
    /// Issue-tracker reference (e.g. "ENG-482"), set by the automatic pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_key: Option<String>,
    /// Ticketing-system reference, set by the manual pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<String>,
}

impl LinkedTickets {
    pub fn is_empty(&self) -> bool {
        self.issue_key.is_none() && self.ticket_id.is_none()
    }
}

/// Free-form body content of a feedback item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FeedbackContent {
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
}

/// One unit of customer feedback tracked on the board.
///
/// Invariants (enforced by the board service, checked in tests):
/// - `id` is unique and immutable for the item's lifetime;
/// - `resolved_at`/`resolved_by` are set iff `status == Done`;
/// - `analysis` is never present while `status == New`. Classification
///   attaches it when moving an item to `analyzed`; an item dragged there
///   by hand stays unanalyzed, and ticket drafting rejects it until an
///   analysis exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FeedbackItem {
    /// Unique identifier for the feedback item
    pub id: String,
    pub company: Company,
    pub channel: Channel,
    pub created_at: DateTime<Utc>,
    pub status: FeedbackStatus,
    pub priority: Priority,
    pub author: AuthorMeta,
    pub content: FeedbackContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<ChannelPayload>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisResult>,
    #[serde(default, skip_serializing_if = "LinkedTickets::is_empty")]
    pub linked: LinkedTickets,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<Resolver>,
    /// Raw source record for items imported from the dataset file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<JsonValue>,
}
