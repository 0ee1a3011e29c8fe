//! # Dataset Source
//!
//! Reads the static JSON feedback dataset from disk and maps each record into
//! the internal [`FeedbackItem`] shape. The dataset uses looser string enums
//! than the board does, so channel/sentiment/priority values go through
//! explicit remapping tables with documented fallbacks for unrecognized
//! values.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::warn;

use crate::models::{
    AuthorMeta, Channel, ChannelPayload, Company, FeedbackItem, FeedbackStatus, Priority,
    analysis::Sentiment, feedback::FeedbackContent,
};

/// Errors raised while loading or mapping the dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("dataset file {path} is not valid JSON: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// Top-level shape of the dataset file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetFile {
    #[serde(default)]
    pub metadata: JsonValue,
    pub feedback: Vec<DatasetFeedbackItem>,
    #[serde(default)]
    pub summary: JsonValue,
}

/// One record as it appears on disk. Enum-ish fields are free strings here
/// and get remapped during conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetFeedbackItem {
    pub id: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub author: Option<DatasetAuthor>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub sentiment: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetAuthor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Reads and parses the full dataset file.
pub async fn load_dataset(path: &Path) -> Result<DatasetFile, DatasetError> {
    let display = path.display().to_string();
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| DatasetError::Io {
            path: display.clone(),
            source,
        })?;
    serde_json::from_str(&raw).map_err(|source| DatasetError::Parse {
        path: display,
        source,
    })
}

/// Channel remapping table. Unrecognized values fall back to email, the
/// least-structured channel.
pub fn map_channel(raw: &str) -> Channel {
    match raw.trim().to_lowercase().as_str() {
        "email" | "mail" => Channel::Email,
        "twitter" | "x" => Channel::Twitter,
        "facebook" => Channel::Facebook,
        "chat" | "live_chat" | "livechat" => Channel::LiveChat,
        "trustpilot" | "review" | "review_site" => Channel::Trustpilot,
        "app_store" | "appstore" | "play_store" => Channel::AppStore,
        "instagram" => Channel::Instagram,
        other => {
            warn!(channel = other, "unrecognized dataset channel, defaulting to email");
            Channel::Email
        }
    }
}

/// Sentiment remapping table; unrecognized values fall back to neutral.
pub fn map_sentiment(raw: &str) -> Sentiment {
    match raw.trim().to_lowercase().as_str() {
        "positive" | "pos" => Sentiment::Positive,
        "negative" | "neg" => Sentiment::Negative,
        "neutral" | "mixed" => Sentiment::Neutral,
        other => {
            warn!(sentiment = other, "unrecognized dataset sentiment, defaulting to neutral");
            Sentiment::Neutral
        }
    }
}

/// Priority remapping table; unrecognized values fall back to medium.
pub fn map_priority(raw: &str) -> Priority {
    match raw.trim().to_lowercase().as_str() {
        "low" | "p3" | "p4" => Priority::Low,
        "medium" | "normal" | "p2" => Priority::Medium,
        "high" | "p1" => Priority::High,
        "critical" | "urgent" | "p0" => Priority::Critical,
        other => {
            warn!(priority = other, "unrecognized dataset priority, defaulting to medium");
            Priority::Medium
        }
    }
}

fn map_company(raw: &str) -> Company {
    match raw.trim().to_lowercase().as_str() {
        "dealspot" => Company::Dealspot,
        _ => Company::Skybound,
    }
}

/// Transforms one dataset record into the internal item shape. Imported
/// items always start in `new` with no analysis attached.
pub fn to_feedback_item(record: &DatasetFeedbackItem) -> FeedbackItem {
    let author = record.author.clone().unwrap_or_default();
    FeedbackItem {
        id: record.id.clone(),
        company: map_company(&record.company),
        channel: map_channel(&record.channel),
        created_at: record.created_at.unwrap_or_else(Utc::now),
        status: FeedbackStatus::New,
        priority: record
            .priority
            .as_deref()
            .map(map_priority)
            .unwrap_or(Priority::Medium),
        author: AuthorMeta {
            name: author.name,
            handle: author.handle,
            email: author.email,
            followers: None,
            device: None,
            verified: None,
        },
        content: FeedbackContent {
            body: record.text.clone(),
            subject: record.subject.clone(),
            excerpt: None,
            translation: None,
        },
        payload: record.rating.map(|stars| ChannelPayload::Rating { stars }),
        tags: record.tags.clone(),
        analysis: None,
        linked: Default::default(),
        resolved_at: None,
        resolved_by: None,
        source: serde_json::to_value(record).ok(),
    }
}

/// Reverse mapping for the fields the dataset shape can represent. Preserves
/// id, channel category and tags.
pub fn to_dataset_record(item: &FeedbackItem) -> DatasetFeedbackItem {
    DatasetFeedbackItem {
        id: item.id.clone(),
        company: item.company.to_string(),
        channel: item.channel.to_string(),
        created_at: Some(item.created_at),
        author: Some(DatasetAuthor {
            name: item.author.name.clone(),
            handle: item.author.handle.clone(),
            email: item.author.email.clone(),
        }),
        subject: item.content.subject.clone(),
        text: item.content.body.clone(),
        rating: match item.payload {
            Some(ChannelPayload::Rating { stars }) => Some(stars),
            _ => None,
        },
        sentiment: item
            .analysis
            .as_ref()
            .map(|analysis| analysis.sentiment.to_string()),
        priority: Some(item.priority.to_string()),
        tags: item.tags.clone(),
    }
}
