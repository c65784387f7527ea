//! Integration tests for the HTTP surface.
//!
//! These tests drive the full router (middleware included) with
//! `tower::ServiceExt::oneshot` and cover:
//! - `/health` and `/info`
//! - `/llm` stub responses and input validation
//! - request IDs, metrics and API docs

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use ona_llm_backend::{build_router, core::init_metrics, AppConfig, AppState};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const STUB_OUTPUT: &str =
    "Stub response. Set OPENAI_API_KEY or ANTHROPIC_API_KEY for real LLM calls.";

/// Create a test application from explicit configuration variables.
fn create_test_app(vars: &[(&str, &str)]) -> Router {
    init_metrics();
    let config = AppConfig::from_vars(vars.iter().copied()).expect("valid test config");
    build_router(Arc::new(AppState::new(config, reqwest::Client::new())))
}

fn llm_request(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .uri("/llm")
        .method("POST")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app(&[]);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], "1.0.0");
    assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
    assert!(json["uptime_seconds"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn test_info_endpoint_stub() {
    let app = create_test_app(&[("APP_NAME", "Test App"), ("ENV", "test")]);

    let response = app
        .oneshot(Request::builder().uri("/info").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "name": "Test App",
            "version": "1.0.0",
            "environment": "test",
            "llm_providers": ["stub"],
            "active_provider": "stub"
        })
    );
}

#[tokio::test]
async fn test_info_endpoint_anthropic_only() {
    let app = create_test_app(&[("ANTHROPIC_API_KEY", "sk-ant-test")]);

    let response = app
        .oneshot(Request::builder().uri("/info").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let json = body_json(response).await;
    assert_eq!(json["llm_providers"], json!(["anthropic"]));
    assert_eq!(json["active_provider"], "anthropic");
}

#[tokio::test]
async fn test_llm_stub_response() {
    let app = create_test_app(&[]);

    let response = app
        .oneshot(llm_request(json!({"prompt": "Hello"}).to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "provider": "stub",
            "model": "none",
            "output": STUB_OUTPUT,
            "stub": true,
            "error": null
        })
    );
}

#[tokio::test]
async fn test_llm_stub_is_deterministic() {
    let app = create_test_app(&[]);

    let first = app
        .clone()
        .oneshot(llm_request(json!({"prompt": "Hello"}).to_string()))
        .await
        .unwrap();
    let second = app
        .oneshot(llm_request(json!({"prompt": "Hello"}).to_string()))
        .await
        .unwrap();

    assert_eq!(body_json(first).await, body_json(second).await);
}

#[tokio::test]
async fn test_llm_empty_prompt_rejected() {
    let app = create_test_app(&[]);

    let response = app
        .oneshot(llm_request(json!({"prompt": ""}).to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["error"]["type"], "invalid_request_error");
    assert_eq!(json["error"]["code"], 422);
}

#[tokio::test]
async fn test_llm_prompt_at_limit_accepted() {
    let app = create_test_app(&[]);
    let prompt = "a".repeat(4000);

    let response = app
        .oneshot(llm_request(json!({ "prompt": prompt }).to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_llm_prompt_over_limit_rejected() {
    let app = create_test_app(&[]);
    let prompt = "a".repeat(4001);

    let response = app
        .oneshot(llm_request(json!({ "prompt": prompt }).to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert!(json["error"]["message"].as_str().unwrap().contains("4001"));
}

#[tokio::test]
async fn test_llm_custom_prompt_limit() {
    let app = create_test_app(&[("MAX_PROMPT_LENGTH", "5")]);

    let response = app
        .oneshot(llm_request(json!({"prompt": "123456"}).to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_llm_missing_prompt_rejected() {
    let app = create_test_app(&[]);

    let response = app
        .oneshot(llm_request(json!({"model": "gpt-4o"}).to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_llm_wrong_prompt_type_rejected() {
    let app = create_test_app(&[]);

    let response = app
        .oneshot(llm_request(json!({"prompt": 42}).to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_llm_invalid_json_rejected() {
    let app = create_test_app(&[]);

    let response = app.oneshot(llm_request("{not json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["error"]["type"], "invalid_request_error");
}

#[tokio::test]
async fn test_llm_get_not_allowed() {
    let app = create_test_app(&[]);

    let response = app
        .oneshot(Request::builder().uri("/llm").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_request_id_generated() {
    let app = create_test_app(&[]);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let request_id = response.headers().get("x-request-id").unwrap();
    assert!(uuid::Uuid::parse_str(request_id.to_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_request_id_echoed() {
    let app = create_test_app(&[]);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/llm")
                .method("POST")
                .header("content-type", "application/json")
                .header("x-request-id", "trace-abc-123")
                .body(Body::from(json!({"prompt": ""}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.headers().get("x-request-id").unwrap(), "trace-abc-123");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = create_test_app(&[]);

    let _ = app
        .clone()
        .oneshot(llm_request(json!({"prompt": "count me"}).to_string()))
        .await
        .unwrap();

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("ona_backend_requests_total"));
    assert!(text.contains("ona_backend_completions_total"));
}

#[tokio::test]
async fn test_openapi_document() {
    let app = create_test_app(&[]);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["paths"]["/llm"].is_object());
}

#[tokio::test]
async fn test_unknown_route() {
    let app = create_test_app(&[]);

    let response = app
        .oneshot(Request::builder().uri("/items").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
