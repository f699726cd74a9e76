//! Integration tests for the onboarding endpoints.
//!
//! The test environment carries no provider credentials, so every flow
//! here runs in simulation mode -- which is exactly the point: the
//! response shapes are identical to live mode, and the session state
//! machine behaves the same.

mod common;

use axum::http::StatusCode;
use common::{body_json, post};
use serde_json::json;

// ---------------------------------------------------------------------------
// Test: start returns a session handle and reports simulation mode
// ---------------------------------------------------------------------------

#[tokio::test]
async fn start_returns_session_and_truthful_mode() {
    let app = common::build_test_app();

    let response = post(
        app,
        "/api/v1/onboarding/start",
        Some(1),
        json!({ "email": "u1@example.com" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = &json["data"];
    assert!(data["session_id"].as_str().unwrap().starts_with("sim-1-"));
    assert!(!data["session_token"].as_str().unwrap().is_empty());
    assert_eq!(data["mode"], "simulated");
    // ISO-8601 expiry, parseable.
    let expires_at = data["expires_at"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(expires_at).is_ok());
}

// ---------------------------------------------------------------------------
// Test: invalid email is rejected before any session is created
// ---------------------------------------------------------------------------

#[tokio::test]
async fn start_rejects_invalid_email() {
    let app = common::build_test_app();

    let response = post(
        app,
        "/api/v1/onboarding/start",
        Some(1),
        json!({ "email": "not-an-email" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Test: the canonical flow -- start, complete, complete again
// ---------------------------------------------------------------------------

#[tokio::test]
async fn complete_links_accounts_and_is_idempotent() {
    let app = common::build_test_app();

    let start = post(
        app.clone(),
        "/api/v1/onboarding/start",
        Some(1),
        json!({ "email": "u1@example.com" }),
    )
    .await;
    let session_id = body_json(start).await["data"]["session_id"]
        .as_str()
        .unwrap()
        .to_string();

    let first = post(
        app.clone(),
        "/api/v1/onboarding/complete",
        Some(1),
        json!({ "session_id": &session_id }),
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);
    let first = body_json(first).await;
    assert_eq!(first["data"]["success"], true);
    assert_eq!(first["data"]["accounts_linked"], 1);

    // A duplicated completion call from a flaky client replays the
    // result instead of double-linking.
    let second = post(
        app.clone(),
        "/api/v1/onboarding/complete",
        Some(1),
        json!({ "session_id": &session_id }),
    )
    .await;
    let second = body_json(second).await;
    assert_eq!(second["data"]["success"], true);
    assert_eq!(second["data"]["accounts_linked"], 1);

    // Exactly one account row exists.
    let accounts = common::get(app, "/api/v1/accounts", Some(1)).await;
    let accounts = body_json(accounts).await;
    assert_eq!(accounts["data"]["total"], 1);
    assert_eq!(
        accounts["data"]["accounts"][0]["provider_account_id"],
        "acct-amazon-001"
    );
}

// ---------------------------------------------------------------------------
// Test: completing an unknown session is 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn complete_unknown_session_is_not_found() {
    let app = common::build_test_app();

    let response = post(
        app,
        "/api/v1/onboarding/complete",
        Some(1),
        json!({ "session_id": "no-such-session" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: completing another user's session is rejected
// ---------------------------------------------------------------------------

#[tokio::test]
async fn complete_foreign_session_is_rejected() {
    let app = common::build_test_app();

    let start = post(
        app.clone(),
        "/api/v1/onboarding/start",
        Some(1),
        json!({ "email": "u1@example.com" }),
    )
    .await;
    let session_id = body_json(start).await["data"]["session_id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = post(
        app,
        "/api/v1/onboarding/complete",
        Some(2),
        json!({ "session_id": session_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Test: repeated starts hand out distinct sessions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn repeated_starts_do_not_collide() {
    let app = common::build_test_app();

    let mut ids = Vec::new();
    for _ in 0..3 {
        let response = post(
            app.clone(),
            "/api/v1/onboarding/start",
            Some(1),
            json!({ "email": "u1@example.com" }),
        )
        .await;
        ids.push(
            body_json(response).await["data"]["session_id"]
                .as_str()
                .unwrap()
                .to_string(),
        );
    }

    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);
}
