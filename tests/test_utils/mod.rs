//! Shared helpers for the integration tests: app construction against mock
//! upstreams, request plumbing, and feedback item builders.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use triageboard::board::lock_board;
use triageboard::config::{AiConfig, AppConfig};
use triageboard::models::{
    AnalysisResult, AuthorMeta, Channel, Classification, Company, FeedbackItem, FeedbackStatus,
    Pipeline, Priority, Sentiment, feedback::FeedbackContent,
};
use triageboard::server::{AppState, create_app};

/// Test configuration pointing every upstream at the given bases.
pub fn test_config(ai_base: &str, issue_base: &str, ticket_base: &str) -> AppConfig {
    AppConfig {
        profile: "test".to_string(),
        ai: AiConfig {
            api_base: ai_base.to_string(),
            api_key: None,
            model: "test-model".to_string(),
            temperature: 0.0,
        },
        issue_tracker_base: issue_base.to_string(),
        ticket_system_base: ticket_base.to_string(),
        ..AppConfig::default()
    }
}

/// App state with all upstreams pointed at unreachable localhost ports, for
/// tests that never leave the process.
pub fn offline_state() -> AppState {
    AppState::from_config(test_config(
        "http://127.0.0.1:1",
        "http://127.0.0.1:1",
        "http://127.0.0.1:1",
    ))
}

/// Builds a feedback item in the given status. Items past `new` carry a
/// minimal bug analysis so status invariants hold.
pub fn item(id: &str, status: FeedbackStatus) -> FeedbackItem {
    FeedbackItem {
        id: id.to_string(),
        company: Company::Skybound,
        channel: Channel::Email,
        created_at: Utc::now() - Duration::minutes(30),
        status,
        priority: Priority::Medium,
        author: AuthorMeta {
            name: "Integration Tester".to_string(),
            ..AuthorMeta::default()
        },
        content: FeedbackContent {
            body: "Checkout fails with a blank screen".to_string(),
            subject: Some("Checkout broken".to_string()),
            ..FeedbackContent::default()
        },
        payload: None,
        tags: vec!["checkout".to_string()],
        analysis: if status == FeedbackStatus::New {
            None
        } else {
            Some(AnalysisResult {
                classification: Classification::Bug,
                sentiment: Sentiment::Negative,
                suggested_pipeline: Pipeline::Manual,
                confidence: 0.9,
                recommended_priority: None,
                reply: None,
                ticket_draft: None,
                assigned_team: None,
                reasoning: None,
            })
        },
        linked: Default::default(),
        resolved_at: None,
        resolved_by: None,
        source: None,
    }
}

/// Inserts items directly into the board behind the state.
pub fn seed(state: &AppState, items: Vec<FeedbackItem>) {
    lock_board(&state.board).store_mut().add_items(items);
}

/// Sends one request through the router and returns (status, parsed body).
pub async fn send(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            builder.body(Body::from(json.to_string())).unwrap()
        }
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// Convenience for tests that reuse one state across several requests.
pub fn app(state: &AppState) -> Router {
    create_app(state.clone())
}
