//! Integration tests for the batched AI stages against a mocked chat
//! endpoint: classification of new items, requirement analysis with a
//! company source reference, and the failure paths that must leave the
//! board untouched.

mod test_utils;

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;
use tempfile::TempDir;
use test_utils::{app, item, seed, send, test_config};
use triageboard::models::FeedbackStatus;
use triageboard::server::AppState;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// State whose chat endpoint is the given mock server; trackers stay
/// unreachable.
fn ai_state(mock: &MockServer) -> AppState {
    AppState::from_config(test_config(
        &mock.uri(),
        "http://127.0.0.1:1",
        "http://127.0.0.1:1",
    ))
}

/// Wraps assistant text in the chat-completion response envelope.
fn chat_reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    }))
}

#[tokio::test]
async fn classify_applies_results_and_moves_items() {
    let mock = MockServer::start().await;
    let content = format!(
        "Here is the triage outcome:\n```json\n{}\n```",
        json!({
            "results": [
                {
                    "id": "fb-1",
                    "classification": "bug",
                    "confidence": 0.92,
                    "sentiment": "negative",
                    "suggested_pipeline": "automatic",
                    "assigned_team": "payments"
                },
                {
                    "id": "fb-2",
                    "classification": "feature",
                    "confidence": 0.81,
                    // Non-bug routed automatic must be forced back to manual.
                    "suggested_pipeline": "automatic"
                }
            ],
            "summary": {}
        })
    );
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(chat_reply(&content))
        .expect(1)
        .mount(&mock)
        .await;

    let state = ai_state(&mock);
    seed(
        &state,
        vec![
            item("fb-1", FeedbackStatus::New),
            item("fb-2", FeedbackStatus::New),
        ],
    );

    let (status, body) = send(
        app(&state),
        "POST",
        "/process/classify",
        Some(json!({"ids": ["fb-1", "fb-2"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["requested"], 2);
    assert_eq!(body["applied"].as_array().unwrap().len(), 2);

    let (_, first) = send(app(&state), "GET", "/items/fb-1", None).await;
    assert_eq!(first["status"], "analyzed");
    assert_eq!(first["analysis"]["classification"], "bug");
    assert_eq!(first["analysis"]["suggested_pipeline"], "automatic");
    assert_eq!(first["analysis"]["assigned_team"], "payments");

    let (_, second) = send(app(&state), "GET", "/items/fb-2", None).await;
    assert_eq!(second["analysis"]["classification"], "feature");
    assert_eq!(second["analysis"]["suggested_pipeline"], "manual");
}

#[tokio::test]
async fn provider_failure_leaves_the_batch_untouched() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&mock)
        .await;

    let state = ai_state(&mock);
    seed(&state, vec![item("fb-1", FeedbackStatus::New)]);

    let (status, body) = send(
        app(&state),
        "POST",
        "/process/classify",
        Some(json!({"ids": ["fb-1"]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "PROVIDER_ERROR");

    let (_, current) = send(app(&state), "GET", "/items/fb-1", None).await;
    assert_eq!(current["status"], "new");
    assert!(current["analysis"].is_null());
}

#[tokio::test]
async fn cancelling_mid_flight_reports_conflict_and_applies_nothing() {
    let mock = MockServer::start().await;
    // The upstream stalls long enough for the cancel to land first.
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(chat_reply("{\"results\": [], \"summary\": {}}")
            .set_delay(Duration::from_secs(30)))
        .mount(&mock)
        .await;

    let state = ai_state(&mock);
    seed(&state, vec![item("fb-1", FeedbackStatus::New)]);

    let request = tokio::spawn(send(
        app(&state),
        "POST",
        "/process/classify",
        Some(json!({"ids": ["fb-1"]})),
    ));
    tokio::time::sleep(Duration::from_millis(100)).await;
    state.cancel.cancel();

    let (status, body) = request.await.unwrap();
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CANCELLED");

    // The batch applied nothing.
    let (_, current) = send(app(&state), "GET", "/items/fb-1", None).await;
    assert_eq!(current["status"], "new");
    assert!(current.get("analysis").is_none());
}

#[tokio::test]
async fn mixed_status_batch_is_rejected_before_any_network_call() {
    let mock = MockServer::start().await;
    // Zero expected calls: validation must fail under the lock first.
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(chat_reply("{}"))
        .expect(0)
        .mount(&mock)
        .await;

    let state = ai_state(&mock);
    seed(
        &state,
        vec![
            item("fb-1", FeedbackStatus::New),
            item("fb-2", FeedbackStatus::Analyzed),
        ],
    );

    let (status, body) = send(
        app(&state),
        "POST",
        "/process/classify",
        Some(json!({"ids": ["fb-1", "fb-2"]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn classify_rejects_empty_batches_and_unknown_ids() {
    let mock = MockServer::start().await;
    let state = ai_state(&mock);

    let (status, _) = send(
        app(&state),
        "POST",
        "/process/classify",
        Some(json!({"ids": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        app(&state),
        "POST",
        "/process/classify",
        Some(json!({"ids": ["ghost"]})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn requirements_route_items_into_both_pipelines() {
    let mock = MockServer::start().await;
    let content = json!({
        "results": [
            {
                "id": "fb-1",
                "outcome": "automatic",
                "issue_draft": {
                    "summary": "Fix blank checkout screen",
                    "description": "Null cart total crashes the renderer"
                }
            },
            {
                "id": "fb-2",
                "outcome": "manual",
                "ticket_draft": {
                    "summary": "Follow up on checkout report",
                    "description": "Needs a human to reproduce"
                }
            }
        ],
        "summary": {}
    })
    .to_string();
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(chat_reply(&content))
        .expect(1)
        .mount(&mock)
        .await;

    let references = TempDir::new().unwrap();
    std::fs::write(
        references.path().join("skybound.md"),
        "# Skybound checkout service\nfn checkout() {}\n",
    )
    .unwrap();

    let mut config = test_config(&mock.uri(), "http://127.0.0.1:1", "http://127.0.0.1:1");
    config.source_reference_dir = references.path().to_string_lossy().into_owned();
    let state = AppState::from_config(config);
    seed(
        &state,
        vec![
            item("fb-1", FeedbackStatus::Analyzed),
            item("fb-2", FeedbackStatus::Analyzed),
        ],
    );

    let (status, body) = send(
        app(&state),
        "POST",
        "/process/requirements",
        Some(json!({"ids": ["fb-1", "fb-2"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applied"].as_array().unwrap().len(), 2);

    let (_, first) = send(app(&state), "GET", "/items/fb-1", None).await;
    assert_eq!(first["status"], "automatic");
    let (_, second) = send(app(&state), "GET", "/items/fb-2", None).await;
    assert_eq!(second["status"], "manual");
    assert_eq!(
        second["analysis"]["ticket_draft"]["summary"],
        "Follow up on checkout report"
    );
}

#[tokio::test]
async fn requirements_without_a_source_reference_fail_fast() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(chat_reply("{}"))
        .expect(0)
        .mount(&mock)
        .await;

    let references = TempDir::new().unwrap();
    let mut config = test_config(&mock.uri(), "http://127.0.0.1:1", "http://127.0.0.1:1");
    config.source_reference_dir = references.path().to_string_lossy().into_owned();
    let state = AppState::from_config(config);
    seed(&state, vec![item("fb-1", FeedbackStatus::Analyzed)]);

    let (status, body) = send(
        app(&state),
        "POST",
        "/process/requirements",
        Some(json!({"ids": ["fb-1"]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert!(body["message"].as_str().unwrap().contains("source reference"));
}
