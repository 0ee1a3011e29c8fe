//! # Data Models
//!
//! This module contains all the data models used throughout the triage board API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod activity;
pub mod analysis;
pub mod feedback;

pub use activity::{ActivityEvent, ActivityKind, Actor};
pub use analysis::{
    AnalysisResult, Classification, CustomerReply, Pipeline, ReplyTone, Sentiment, TicketDraft,
};
pub use feedback::{
    AuthorMeta, Channel, ChannelPayload, Company, FeedbackItem, FeedbackStatus, LinkedTickets,
    Priority, Resolver,
};

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "triageboard".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
