//! # Tracker Integrations
//!
//! HTTP clients for the external issue tracker (automatic pipeline) and
//! ticketing system (manual pipeline). Items reaching a terminal pipeline
//! stage get a resource created in the matching tracker; the board applies
//! the link optimistically and rolls back if the call fails.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

use crate::ai::extract::truncate_chars;
use crate::models::TicketDraft;

/// Errors from tracker endpoints.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("{tracker} returned status {status}: {snippet}")]
    Provider {
        tracker: &'static str,
        status: u16,
        snippet: String,
    },
    #[error("failed to reach {tracker}: {source}")]
    Network {
        tracker: &'static str,
        source: reqwest::Error,
    },
}

/// Reference to a resource created in an external tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CreatedTicket {
    /// Human-facing reference, e.g. "ENG-482" or "TKT-10052".
    pub reference: String,
    pub url: String,
}

/// Common interface over the two tracker backends.
#[async_trait]
pub trait TrackerClient: Send + Sync {
    /// Short name used in logs and error messages.
    fn kind(&self) -> &'static str;

    /// Creates a resource for the given feedback item.
    async fn create(
        &self,
        feedback_id: &str,
        draft: &TicketDraft,
        assigned_team: Option<&str>,
    ) -> Result<CreatedTicket, TrackerError>;
}

/// Issue-tracker client (automatic pipeline).
#[derive(Debug, Clone)]
pub struct IssueTrackerClient {
    http: reqwest::Client,
    api_base: String,
}

impl IssueTrackerClient {
    pub fn new(api_base: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Deserialize)]
struct IssueCreatedResponse {
    key: String,
    url: String,
}

#[async_trait]
impl TrackerClient for IssueTrackerClient {
    fn kind(&self) -> &'static str {
        "issue-tracker"
    }

    async fn create(
        &self,
        feedback_id: &str,
        draft: &TicketDraft,
        assigned_team: Option<&str>,
    ) -> Result<CreatedTicket, TrackerError> {
        let url = format!("{}/issues", self.api_base);
        let body = json!({
            "feedbackId": feedback_id,
            "issue": draft,
            "assignedTeam": assigned_team,
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|source| TrackerError::Network {
                tracker: "issue-tracker",
                source,
            })?;

        let status = response.status();
        if !matches!(status, StatusCode::OK | StatusCode::CREATED) {
            let body_text = response.text().await.unwrap_or_default();
            return Err(TrackerError::Provider {
                tracker: "issue-tracker",
                status: status.as_u16(),
                snippet: truncate_chars(&body_text, 200),
            });
        }

        let created: IssueCreatedResponse =
            response.json().await.map_err(|source| TrackerError::Network {
                tracker: "issue-tracker",
                source,
            })?;
        Ok(CreatedTicket {
            reference: created.key,
            url: created.url,
        })
    }
}

/// Ticketing-system client (manual pipeline).
#[derive(Debug, Clone)]
pub struct TicketSystemClient {
    http: reqwest::Client,
    api_base: String,
}

impl TicketSystemClient {
    pub fn new(api_base: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Deserialize)]
struct TicketCreatedResponse {
    number: u64,
    url: String,
}

#[async_trait]
impl TrackerClient for TicketSystemClient {
    fn kind(&self) -> &'static str {
        "ticket-system"
    }

    async fn create(
        &self,
        feedback_id: &str,
        draft: &TicketDraft,
        assigned_team: Option<&str>,
    ) -> Result<CreatedTicket, TrackerError> {
        let url = format!("{}/tickets", self.api_base);
        let body = json!({
            "feedbackId": feedback_id,
            "ticket": draft,
            "assignedTeam": assigned_team,
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|source| TrackerError::Network {
                tracker: "ticket-system",
                source,
            })?;

        let status = response.status();
        if !matches!(status, StatusCode::OK | StatusCode::CREATED) {
            let body_text = response.text().await.unwrap_or_default();
            return Err(TrackerError::Provider {
                tracker: "ticket-system",
                status: status.as_u16(),
                snippet: truncate_chars(&body_text, 200),
            });
        }

        let created: TicketCreatedResponse =
            response.json().await.map_err(|source| TrackerError::Network {
                tracker: "ticket-system",
                source,
            })?;
        Ok(CreatedTicket {
            reference: format!("TKT-{}", created.number),
            url: created.url,
        })
    }
}
