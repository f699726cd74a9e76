#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use tally_api::config::ServerConfig;
use tally_api::router::build_app_router;
use tally_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
    }
}

/// Build the full application router with all middleware layers.
///
/// This mirrors the router construction in `main.rs` so integration
/// tests exercise the same middleware stack (CORS, request ID, timeout,
/// tracing, panic recovery) that production uses. State is fresh per
/// call: empty stores, provider mode resolved from the (unset) test
/// environment, i.e. simulation.
pub fn build_test_app() -> Router {
    let config = test_config();
    build_app_router(AppState::new(config.clone()), &config)
}

/// Issue a request against the app, optionally authenticated via the
/// `x-user-id` header and optionally carrying a JSON body.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    user_id: Option<i64>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = user_id {
        builder = builder.header("x-user-id", id.to_string());
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str, user_id: Option<i64>) -> Response {
    send(app, Method::GET, uri, user_id, None).await
}

pub async fn post(
    app: Router,
    uri: &str,
    user_id: Option<i64>,
    body: serde_json::Value,
) -> Response {
    send(app, Method::POST, uri, user_id, Some(body)).await
}

pub async fn delete(app: Router, uri: &str, user_id: Option<i64>) -> Response {
    send(app, Method::DELETE, uri, user_id, None).await
}

/// Collect and parse a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Drive the full onboarding flow for a user against the given app and
/// return the completion payload's `data` object.
pub async fn onboard(app: &Router, user_id: i64) -> serde_json::Value {
    let start = post(
        app.clone(),
        "/api/v1/onboarding/start",
        Some(user_id),
        serde_json::json!({ "email": format!("user{user_id}@example.com") }),
    )
    .await;
    assert!(start.status().is_success(), "onboarding start failed");
    let start_json = body_json(start).await;
    let session_id = start_json["data"]["session_id"].as_str().unwrap().to_string();

    let complete = post(
        app.clone(),
        "/api/v1/onboarding/complete",
        Some(user_id),
        serde_json::json!({ "session_id": session_id }),
    )
    .await;
    assert!(complete.status().is_success(), "onboarding complete failed");
    body_json(complete).await["data"].clone()
}
