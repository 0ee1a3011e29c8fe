//! AI processing orchestrator.
//!
//! Runs the two batched analysis stages against the chat endpoint:
//! classification of `new` items and requirement analysis of `analyzed`
//! items. Each stage sends the whole batch in one request, extracts a JSON
//! payload from the (possibly fenced or prose-wrapped) response, and returns
//! per-item results keyed by feedback id. Applying results to the store is
//! the board service's job; no state is touched here, so a failed or
//! cancelled call leaves everything unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::models::{
    Classification, CustomerReply, FeedbackItem, Pipeline, Priority, Sentiment, TicketDraft,
};

use super::client::{AiError, ChatClient};
use super::extract::extract_json;

/// Simplified wire record submitted for each item in a batch.
#[derive(Debug, Clone, Serialize)]
pub struct WireFeedbackItem {
    pub id: String,
    pub company: String,
    pub channel: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment_hint: Option<String>,
    pub priority_hint: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl WireFeedbackItem {
    pub fn from_item(item: &FeedbackItem) -> Self {
        Self {
            id: item.id.clone(),
            company: item.company.to_string(),
            channel: item.channel.to_string(),
            text: item.content.body.clone(),
            sentiment_hint: item
                .analysis
                .as_ref()
                .map(|analysis| analysis.sentiment.to_string()),
            priority_hint: item.priority.to_string(),
            tags: item.tags.clone(),
        }
    }
}

/// Per-item result of the classification stage.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassificationResult {
    pub id: String,
    pub classification: Classification,
    /// Clamped to 0.0..=1.0 during normalization.
    pub confidence: f64,
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
    #[serde(default)]
    pub recommended_priority: Option<Priority>,
    #[serde(default)]
    pub reply: Option<CustomerReply>,
    #[serde(default)]
    pub ticket_draft: Option<TicketDraft>,
    pub suggested_pipeline: Pipeline,
    #[serde(default)]
    pub assigned_team: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClassificationResponse {
    results: Vec<ClassificationResult>,
    #[serde(default)]
    #[allow(dead_code)]
    summary: JsonValue,
}

/// Per-item result of the requirement-analysis stage.
#[derive(Debug, Clone, Deserialize)]
pub struct RequirementResult {
    pub id: String,
    pub outcome: Pipeline,
    /// Issue-tracker draft; expected for `automatic` outcomes.
    #[serde(default)]
    pub issue_draft: Option<TicketDraft>,
    /// Ticketing-system draft; expected for `manual` outcomes.
    #[serde(default)]
    pub ticket_draft: Option<TicketDraft>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RequirementResponse {
    results: Vec<RequirementResult>,
    #[serde(default)]
    #[allow(dead_code)]
    summary: JsonValue,
}

const CLASSIFICATION_SYSTEM_PROMPT: &str = "You are a product-feedback triage assistant. \
Classify each feedback item as bug, feature or clarification, recommend a priority, draft a \
customer reply, and suggest a processing pipeline. Only items classified as bug may be routed \
to the automatic pipeline. Respond with a single JSON object and nothing else.";

const REQUIREMENT_SYSTEM_PROMPT: &str = "You are a requirements analyst for a product-feedback \
pipeline. For each analyzed feedback item decide whether it can be fixed automatically or needs \
manual handling, using the provided source reference for context. Produce an issue draft for \
automatic outcomes and a ticket draft for manual outcomes. Respond with a single JSON object \
and nothing else.";

/// Batch orchestrator over the chat client.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    client: ChatClient,
}

impl Orchestrator {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }

    /// Stage one: classify a batch of `new` items in a single request.
    pub async fn classify(
        &self,
        items: &[FeedbackItem],
        cancel: &CancellationToken,
    ) -> Result<Vec<ClassificationResult>, AiError> {
        let wire: Vec<WireFeedbackItem> = items.iter().map(WireFeedbackItem::from_item).collect();
        let prompt = format!(
            "Classify the following feedback items. Reply with JSON of the shape \
             {{\"results\": [{{\"id\", \"classification\", \"confidence\", \"sentiment\", \
             \"recommended_priority\", \"reply\": {{\"text\", \"tone\", \"follow_up\"}}, \
             \"ticket_draft\", \"suggested_pipeline\", \"assigned_team\", \"reasoning\"}}], \
             \"summary\": {{}}}}.\n\nItems:\n{}",
            serde_json::to_string_pretty(&wire).unwrap_or_default()
        );

        let raw = self
            .client
            .complete(CLASSIFICATION_SYSTEM_PROMPT, &prompt, cancel)
            .await?;
        let payload = extract_json(&raw)?;
        let mut response: ClassificationResponse =
            serde_json::from_value(payload).map_err(|err| AiError::Validation(format!(
                "classification response had unexpected shape: {err}"
            )))?;

        for result in &mut response.results {
            normalize_classification(result);
        }
        info!(
            batch = items.len(),
            results = response.results.len(),
            "classification batch completed"
        );
        Ok(response.results)
    }

    /// Stage two: requirement analysis over same-company `analyzed` items,
    /// with a company source-code reference as extra context.
    pub async fn analyze_requirements(
        &self,
        items: &[FeedbackItem],
        source_reference: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<RequirementResult>, AiError> {
        let wire: Vec<WireFeedbackItem> = items.iter().map(WireFeedbackItem::from_item).collect();
        let prompt = format!(
            "Decide manual or automatic handling for each item. Reply with JSON of the shape \
             {{\"results\": [{{\"id\", \"outcome\", \"issue_draft\", \"ticket_draft\", \
             \"reasoning\"}}], \"summary\": {{}}}}.\n\nSource reference:\n{}\n\nItems:\n{}",
            source_reference,
            serde_json::to_string_pretty(&wire).unwrap_or_default()
        );

        let raw = self
            .client
            .complete(REQUIREMENT_SYSTEM_PROMPT, &prompt, cancel)
            .await?;
        let payload = extract_json(&raw)?;
        let response: RequirementResponse =
            serde_json::from_value(payload).map_err(|err| AiError::Validation(format!(
                "requirement response had unexpected shape: {err}"
            )))?;
        info!(
            batch = items.len(),
            results = response.results.len(),
            "requirement batch completed"
        );
        Ok(response.results)
    }
}

/// Defensive normalization of a classification result: clamps confidence and
/// enforces the routing rule that only bug classifications may be sent to the
/// automatic pipeline, even if the upstream model says otherwise.
fn normalize_classification(result: &mut ClassificationResult) {
    result.confidence = result.confidence.clamp(0.0, 1.0);
    if result.classification != Classification::Bug
        && result.suggested_pipeline == Pipeline::Automatic
    {
        warn!(
            id = %result.id,
            classification = %result.classification,
            "model suggested automatic pipeline for a non-bug; forcing manual"
        );
        result.suggested_pipeline = Pipeline::Manual;
    }
}
