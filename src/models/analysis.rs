//! AI analysis result model
//!
//! Structured output of the classification and requirement-analysis stages,
//! attached to a feedback item once it leaves the `new` column.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Sentiment detected for a feedback item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        };
        f.write_str(s)
    }
}

/// How a piece of feedback was classified by stage one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Bug,
    Feature,
    Clarification,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Classification::Bug => "bug",
            Classification::Feature => "feature",
            Classification::Clarification => "clarification",
        };
        f.write_str(s)
    }
}

/// Which processing pipeline an item is routed to after analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Pipeline {
    Manual,
    Automatic,
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Pipeline::Manual => "manual",
            Pipeline::Automatic => "automatic",
        };
        f.write_str(s)
    }
}

/// Tone of the suggested customer-facing reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReplyTone {
    Apologetic,
    Friendly,
    Formal,
}

/// Suggested customer-facing reply produced by classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CustomerReply {
    pub text: String,
    pub tone: ReplyTone,
    /// Whether the agent should follow up after the fix ships.
    #[serde(default)]
    pub follow_up: bool,
}

/// Draft for an external tracker resource, produced by the AI stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TicketDraft {
    pub summary: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    /// Rough effort estimate (e.g. "small", "2d").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<String>,
}

/// Analysis payload attached to a feedback item by the AI orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalysisResult {
    pub classification: Classification,
    pub sentiment: Sentiment,
    /// Pipeline suggested by stage one; only `Bug` items may carry `Automatic`.
    pub suggested_pipeline: Pipeline,
    /// Model confidence in the classification, clamped to 0.0..=1.0.
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_priority: Option<super::feedback::Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<CustomerReply>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_draft: Option<TicketDraft>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}
