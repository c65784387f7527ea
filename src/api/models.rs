//! API request and response models.
//!
//! The `/llm` response body is [`CompletionResult`](crate::services::CompletionResult),
//! owned by the service layer; everything else on the wire lives here.

use crate::services::Provider;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /llm`.
///
/// Unknown keys, including a client-supplied `model`, are ignored. The model
/// always comes from configuration.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"prompt": "Write a haiku about Rust"}))]
pub struct LlmRequest {
    /// Prompt text, 1 to `MAX_PROMPT_LENGTH` characters
    pub prompt: String,
}

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "status": "ok",
    "timestamp": "2024-01-15T10:30:00.000000Z",
    "version": "1.0.0",
    "uptime_seconds": 42.5
}))]
pub struct HealthResponse {
    pub status: String,
    /// RFC 3339 UTC timestamp
    pub timestamp: String,
    pub version: String,
    pub uptime_seconds: f64,
}

/// Application metadata and provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "name": "Ona FastAPI Backend",
    "version": "1.0.0",
    "environment": "development",
    "llm_providers": ["openai", "anthropic"],
    "active_provider": "openai"
}))]
pub struct InfoResponse {
    pub name: String,
    pub version: String,
    pub environment: String,
    /// Configured providers in priority order, or `["stub"]`
    pub llm_providers: Vec<Provider>,
    /// Provider `/llm` will use
    pub active_provider: Provider,
}

/// Error response for API errors.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": {
        "message": "Validation error: prompt must not be empty",
        "type": "invalid_request_error",
        "code": 422
    }
}))]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

/// Error detail in API error responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: String,
    pub code: u16,
}
