//! # Chat Endpoint E2E Tests
//!
//! Spawns the full server with the model endpoint mocked by `httpmock`.

mod common;

use anyhow::Result;
use askpti::{ConversationTurn, ERROR_MARKER};
use askpti_server::types::{ApiResponse, ChatResponse};
use askpti_test_utils::PTI_LOCATION;
use httpmock::Method;
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::common::{completion, generate_jwt, generate_jwt_with_expiry, TestApp};

#[tokio::test]
async fn test_root_and_health() -> Result<()> {
    let app = TestApp::spawn().await?;

    let root = app.client.get(&app.address).send().await?;
    assert_eq!(root.status(), StatusCode::OK);
    assert_eq!(root.text().await?, "askpti server is running.");

    let health = app
        .client
        .get(format!("{}/health", app.address))
        .send()
        .await?;
    assert_eq!(health.text().await?, "OK");
    Ok(())
}

#[tokio::test]
async fn test_public_chat_answers_from_corpus_and_issues_session() -> Result<()> {
    // --- 1. Arrange ---
    let app = TestApp::spawn().await?;
    let model_mock = app.mock_server.mock(|when, then| {
        when.method(Method::POST)
            .path("/v1/chat/completions")
            .body_contains("Where is PTI located?")
            .body_contains(PTI_LOCATION);
        then.status(200).json_body(completion(PTI_LOCATION));
    });

    // --- 2. Act ---
    let response = app
        .client
        .post(format!("{}/chat/public", app.address))
        .json(&json!({ "query": "Where is PTI located?" }))
        .send()
        .await?;

    // --- 3. Assert ---
    assert_eq!(response.status(), StatusCode::OK);
    let body: ApiResponse<ChatResponse> = response.json().await?;
    assert_eq!(body.result.text, PTI_LOCATION);
    assert!(body.debug.is_none());
    assert!(body.result.warning.is_none());

    let session_id = body.result.session_id.expect("a session id is issued");
    assert_eq!(session_id.len(), 36);
    model_mock.assert();

    let history = app.app_state.public_room.history(&session_id).await?;
    assert_eq!(
        history,
        vec![
            ConversationTurn::user("Where is PTI located?"),
            ConversationTurn::assistant(PTI_LOCATION),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_public_chat_keeps_issued_session_and_reports_debug() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.mock_server.mock(|when, then| {
        when.method(Method::POST).path("/v1/chat/completions");
        then.status(200).json_body(completion("Admissions open in May."));
    });

    let first: Value = app
        .client
        .post(format!("{}/chat/public", app.address))
        .json(&json!({ "query": "Hello" }))
        .send()
        .await?
        .json()
        .await?;
    let session_id = first["result"]["session_id"].as_str().unwrap().to_string();

    let response = app
        .client
        .post(format!("{}/chat/public?debug=true", app.address))
        .json(&json!({ "query": "When do admissions open?", "session_id": session_id }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["result"]["session_id"], session_id.as_str());
    assert_eq!(body["debug"]["variant"], "restrictive");
    assert_eq!(body["debug"]["degraded"], false);
    let prompt = body["debug"]["prompt"]["user"].as_str().unwrap();
    assert!(prompt.contains("If a user asks something unrelated, politely refuse."));
    assert!(prompt.contains("User Input: When do admissions open?"));
    assert_eq!(app.app_state.public_room.history(&session_id).await?.len(), 4);
    Ok(())
}

#[tokio::test]
async fn test_public_chat_replaces_unknown_session_ids() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.mock_server.mock(|when, then| {
        when.method(Method::POST).path("/v1/chat/completions");
        then.status(200).json_body(completion("Admissions open in May."));
    });

    let mut issued = Vec::new();
    for i in 0..5 {
        let body: Value = app
            .client
            .post(format!("{}/chat/public", app.address))
            .json(&json!({ "query": "When do admissions open?", "session_id": format!("chosen-{i}") }))
            .send()
            .await?
            .json()
            .await?;
        let session_id = body["result"]["session_id"].as_str().unwrap().to_string();
        assert_ne!(session_id, format!("chosen-{i}"));
        assert_eq!(session_id.len(), 36);
        issued.push(session_id);
    }

    // The harness caps the public room at two sessions.
    assert_eq!(app.app_state.public_sessions.len().await, 2);
    assert!(!app.app_state.public_sessions.contains(&issued[0]).await);
    assert!(app.app_state.public_sessions.contains(&issued[4]).await);
    for i in 0..5 {
        assert!(!app.app_state.public_sessions.contains(&format!("chosen-{i}")).await);
    }
    Ok(())
}

#[tokio::test]
async fn test_public_chat_rejects_empty_query() -> Result<()> {
    let app = TestApp::spawn().await?;

    let response = app
        .client
        .post(format!("{}/chat/public", app.address))
        .json(&json!({ "query": "   " }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["error"], "query must not be empty.");
    Ok(())
}

#[tokio::test]
async fn test_model_failure_degrades_to_marker_text() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.mock_server.mock(|when, then| {
        when.method(Method::POST).path("/v1/chat/completions");
        then.status(500).body("model overloaded");
    });

    let response = app
        .client
        .post(format!("{}/chat/public", app.address))
        .json(&json!({ "query": "Where is PTI located?" }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: ApiResponse<ChatResponse> = response.json().await?;
    assert!(body.result.text.starts_with(ERROR_MARKER));
    assert!(body.result.text.contains("model overloaded"));
    Ok(())
}

#[tokio::test]
async fn test_private_endpoints_require_a_valid_token() -> Result<()> {
    let app = TestApp::spawn().await?;
    let url = format!("{}/chat/private", app.address);

    let missing = app
        .client
        .post(&url)
        .json(&json!({ "query": "Who is the rector?" }))
        .send()
        .await?;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let garbage = app
        .client
        .post(&url)
        .bearer_auth("not-a-jwt")
        .json(&json!({ "query": "Who is the rector?" }))
        .send()
        .await?;
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);

    let expired_token = generate_jwt_with_expiry("staff-1", None, -3600)?;
    let expired = app
        .client
        .get(format!("{}/chat/private/history", app.address))
        .bearer_auth(expired_token)
        .send()
        .await?;
    assert_eq!(expired.status(), StatusCode::UNAUTHORIZED);
    let body: Value = expired.json().await?;
    assert_eq!(body["error"], "Invalid or expired token.");
    Ok(())
}

#[tokio::test]
async fn test_private_chat_persists_history_per_user() -> Result<()> {
    // --- 1. Arrange ---
    let app = TestApp::spawn().await?;
    let first_mock = app.mock_server.mock(|when, then| {
        when.method(Method::POST)
            .path("/v1/chat/completions")
            .body_contains("User Question: Who is the rector?");
        then.status(200).json_body(completion("Dr. Okoro."));
    });
    let second_mock = app.mock_server.mock(|when, then| {
        when.method(Method::POST)
            .path("/v1/chat/completions")
            .body_contains("assistant: Dr. Okoro.")
            .body_contains("User Question: How do I reach him?");
        then.status(200).json_body(completion("Via the registry."));
    });
    let token = generate_jwt("staff-1", Some("ada@pti.edu.ng"))?;
    let url = format!("{}/chat/private", app.address);

    // --- 2. Act ---
    for query in ["Who is the rector?", "How do I reach him?"] {
        let response = app
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&json!({ "query": query }))
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        let body: ApiResponse<ChatResponse> = response.json().await?;
        assert!(body.result.session_id.is_none());
    }

    // --- 3. Assert ---
    first_mock.assert();
    second_mock.assert();

    let response = app
        .client
        .get(format!("{}/chat/private/history", app.address))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: ApiResponse<Vec<ConversationTurn>> = response.json().await?;
    assert_eq!(
        body.result,
        vec![
            ConversationTurn::user("Who is the rector?"),
            ConversationTurn::assistant("Dr. Okoro."),
            ConversationTurn::user("How do I reach him?"),
            ConversationTurn::assistant("Via the registry."),
        ]
    );

    // The history is keyed by email, so another user sees nothing.
    let other = generate_jwt("staff-2", None)?;
    let response = app
        .client
        .get(format!("{}/chat/private/history", app.address))
        .bearer_auth(other)
        .send()
        .await?;
    let body: ApiResponse<Vec<ConversationTurn>> = response.json().await?;
    assert!(body.result.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_private_chat_unavailable_without_secret() -> Result<()> {
    let app = TestApp::spawn_with(None).await?;
    let token = generate_jwt("staff-1", None)?;

    let response = app
        .client
        .post(format!("{}/chat/private", app.address))
        .bearer_auth(token)
        .json(&json!({ "query": "Who is the rector?" }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    Ok(())
}
