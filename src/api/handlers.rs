//! HTTP request handlers.
//!
//! `/llm` is the only handler with real work: it validates the body, takes a
//! credential snapshot and hands both to the dispatcher. Provider failures come
//! back inside a 200 response; only invalid input (422) and internal faults
//! (500) use error statuses.

use crate::api::models::{HealthResponse, InfoResponse, LlmRequest};
use crate::core::config::AppConfig;
use crate::core::{AppError, Result};
use crate::services::completion_service::{configured_providers, select_provider, ProviderSelection};
use crate::services::{CompletionDispatcher, CompletionRequest, CompletionResult, Provider};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;
use std::time::Instant;

/// Shared application state.
pub struct AppState {
    pub config: AppConfig,
    pub dispatcher: CompletionDispatcher,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: AppConfig, http_client: reqwest::Client) -> Self {
        let dispatcher = CompletionDispatcher::from_config(http_client, &config.llm);
        Self {
            config,
            dispatcher,
            started_at: Instant::now(),
        }
    }
}

/// Liveness check.
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        version: state.config.app.version.clone(),
        uptime_seconds: state.started_at.elapsed().as_secs_f64(),
    })
}

/// Application metadata and configured providers.
#[utoipa::path(
    get,
    path = "/info",
    tag = "system",
    responses(
        (status = 200, description = "Application info", body = InfoResponse)
    )
)]
pub async fn info(State(state): State<Arc<AppState>>) -> Json<InfoResponse> {
    let credentials = state.config.llm.credentials();
    let mut llm_providers = configured_providers(&credentials);
    if llm_providers.is_empty() {
        llm_providers.push(Provider::Stub);
    }
    let active_provider = match select_provider(&credentials) {
        ProviderSelection::Upstream { protocol, .. } => Provider::from(protocol),
        ProviderSelection::Stub => Provider::Stub,
    };

    let app = &state.config.app;
    Json(InfoResponse {
        name: app.name.clone(),
        version: app.version.clone(),
        environment: app.environment.clone(),
        llm_providers,
        active_provider,
    })
}

/// Generate a completion for a single prompt.
///
/// Uses OpenAI when `OPENAI_API_KEY` is set, otherwise Anthropic when
/// `ANTHROPIC_API_KEY` is set, otherwise returns a stub response.
#[utoipa::path(
    post,
    path = "/llm",
    tag = "llm",
    request_body = LlmRequest,
    responses(
        (status = 200, description = "Completion result; provider failures set `error`", body = CompletionResult),
        (status = 422, description = "Invalid request body", body = crate::api::models::ApiErrorResponse),
        (status = 500, description = "Internal error", body = crate::api::models::ApiErrorResponse)
    )
)]
pub async fn llm_completion(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<LlmRequest>, JsonRejection>,
) -> Result<Json<CompletionResult>> {
    let Json(body) = payload.inspect_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "Rejected /llm request body");
    })?;

    let request = CompletionRequest::new(body.prompt, state.config.llm.max_prompt_length)
        .inspect_err(|e| tracing::warn!(error = %e, "Rejected /llm prompt"))?;

    let credentials = state.config.llm.credentials();
    Ok(Json(state.dispatcher.dispatch(&request, &credentials).await))
}

/// Prometheus metrics endpoint.
pub async fn metrics_handler() -> Result<Response> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(([(CONTENT_TYPE, encoder.format_type().to_string())], buffer).into_response())
}
