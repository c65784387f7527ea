//! Completion dispatch.
//!
//! [`CompletionDispatcher::dispatch`] picks exactly one provider from the
//! credential snapshot (OpenAI, then Anthropic, then the stub), makes at most
//! one upstream call and always hands back a [`CompletionResult`]. Upstream
//! failures are part of the result, never an `Err`.

use crate::core::config::{LlmConfig, ProviderCredentials};
use crate::core::error::AppError;
use crate::core::error_types::{ErrorCategoryCode, OUTCOME_SUCCESS};
use crate::core::logging::{get_request_id, prompt_hash_prefix};
use crate::core::metrics::get_metrics;
use crate::services::upstream::{
    build_upstream_request, describe_error_body, send_upstream, UpstreamAuth, UpstreamOutcome,
};
use crate::transformer::{anthropic::ANTHROPIC_VERSION, CompletionPayload, ParseError, Protocol};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use utoipa::ToSchema;

/// Output returned when no provider credential is configured.
pub const STUB_OUTPUT: &str =
    "Stub response. Set OPENAI_API_KEY or ANTHROPIC_API_KEY for real LLM calls.";

/// Model reported by the stub.
pub const STUB_MODEL: &str = "none";

/// Who produced a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAI,
    Anthropic,
    Stub,
}

impl Provider {
    pub const fn as_str(self) -> &'static str {
        match self {
            Provider::OpenAI => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Stub => "stub",
        }
    }
}

impl From<Protocol> for Provider {
    fn from(protocol: Protocol) -> Self {
        match protocol {
            Protocol::OpenAI => Provider::OpenAI,
            Protocol::Anthropic => Provider::Anthropic,
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a prompt was refused before dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("prompt must not be empty")]
    EmptyPrompt,
    #[error("prompt is {length} characters, maximum is {max}")]
    PromptTooLong { length: usize, max: usize },
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// A prompt that has passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    prompt: String,
}

impl CompletionRequest {
    /// Validate a prompt against the configured bound.
    ///
    /// Length is counted in characters.
    ///
    /// ```
    /// use ona_llm_backend::services::completion_service::{CompletionRequest, ValidationError};
    ///
    /// assert!(CompletionRequest::new("Hello", 4000).is_ok());
    /// assert_eq!(
    ///     CompletionRequest::new("", 4000),
    ///     Err(ValidationError::EmptyPrompt)
    /// );
    /// ```
    pub fn new(prompt: impl Into<String>, max_length: usize) -> Result<Self, ValidationError> {
        let prompt = prompt.into();
        let length = prompt.chars().count();
        if length == 0 {
            return Err(ValidationError::EmptyPrompt);
        }
        if length > max_length {
            return Err(ValidationError::PromptTooLong {
                length,
                max: max_length,
            });
        }

        Ok(Self { prompt })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

/// Normalized completion returned by `/llm`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CompletionResult {
    /// Provider that handled the request
    pub provider: Provider,
    /// Model that produced (or would have produced) the output
    #[schema(example = "gpt-4o-mini")]
    pub model: String,
    /// Generated text; empty when the call failed
    pub output: String,
    /// True when no real upstream call was made
    #[serde(rename = "stub")]
    pub is_stub: bool,
    /// Human-readable failure description, `null` on success
    pub error: Option<String>,
}

impl CompletionResult {
    pub fn stub() -> Self {
        Self {
            provider: Provider::Stub,
            model: STUB_MODEL.to_string(),
            output: STUB_OUTPUT.to_string(),
            is_stub: true,
            error: None,
        }
    }

    fn success(provider: Provider, model: &str, output: String) -> Self {
        Self {
            provider,
            model: model.to_string(),
            output,
            is_stub: false,
            error: None,
        }
    }

    fn failure(provider: Provider, model: &str, error: String) -> Self {
        Self {
            provider,
            model: model.to_string(),
            output: String::new(),
            is_stub: false,
            error: Some(error),
        }
    }
}

/// The provider chosen for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderSelection<'a> {
    Upstream {
        protocol: Protocol,
        api_key: &'a str,
        model: &'a str,
    },
    Stub,
}

/// Pick a provider by strict priority: OpenAI, then Anthropic, then the stub.
pub fn select_provider(credentials: &ProviderCredentials) -> ProviderSelection<'_> {
    if let Some(api_key) = credentials.openai_key() {
        return ProviderSelection::Upstream {
            protocol: Protocol::OpenAI,
            api_key,
            model: &credentials.openai_model,
        };
    }
    if let Some(api_key) = credentials.anthropic_key() {
        return ProviderSelection::Upstream {
            protocol: Protocol::Anthropic,
            api_key,
            model: &credentials.anthropic_model,
        };
    }
    ProviderSelection::Stub
}

/// Providers that have a credential, in priority order.
pub fn configured_providers(credentials: &ProviderCredentials) -> Vec<Provider> {
    let mut providers = Vec::with_capacity(2);
    if credentials.openai_key().is_some() {
        providers.push(Provider::OpenAI);
    }
    if credentials.anthropic_key().is_some() {
        providers.push(Provider::Anthropic);
    }
    providers
}

/// Why an upstream call produced no completion. The `Display` text is the
/// `error` string reported to the caller.
#[derive(Debug, Error)]
pub enum UpstreamFailure {
    #[error("{protocol} API error: {status}")]
    HttpStatus { protocol: Protocol, status: u16 },
    #[error("{protocol} returned empty response")]
    EmptyResponse { protocol: Protocol },
    #[error("Request timed out")]
    Timeout,
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Failed to parse response")]
    Parse(#[source] ParseError),
}

impl UpstreamFailure {
    pub fn category(&self) -> ErrorCategoryCode {
        match self {
            UpstreamFailure::HttpStatus { status, .. } => ErrorCategoryCode::from_status(*status),
            UpstreamFailure::EmptyResponse { .. } => ErrorCategoryCode::EmptyResponse,
            UpstreamFailure::Timeout => ErrorCategoryCode::Timeout,
            UpstreamFailure::Transport(_) => ErrorCategoryCode::NetworkError,
            UpstreamFailure::Parse(_) => ErrorCategoryCode::ParseError,
        }
    }
}

/// Selects a provider and performs the single upstream call for a prompt.
///
/// Holds no per-request state; clone it freely.
#[derive(Debug, Clone)]
pub struct CompletionDispatcher {
    http_client: reqwest::Client,
    openai_api_base: String,
    anthropic_api_base: String,
}

impl CompletionDispatcher {
    pub fn new(
        http_client: reqwest::Client,
        openai_api_base: impl Into<String>,
        anthropic_api_base: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            openai_api_base: openai_api_base.into().trim_end_matches('/').to_string(),
            anthropic_api_base: anthropic_api_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(http_client: reqwest::Client, config: &LlmConfig) -> Self {
        Self::new(
            http_client,
            config.openai_api_base.as_str(),
            config.anthropic_api_base.as_str(),
        )
    }

    /// Produce a completion for a validated request.
    pub async fn dispatch(
        &self,
        request: &CompletionRequest,
        credentials: &ProviderCredentials,
    ) -> CompletionResult {
        match select_provider(credentials) {
            ProviderSelection::Upstream {
                protocol,
                api_key,
                model,
            } => {
                tracing::info!(
                    provider = %Provider::from(protocol),
                    model = %model,
                    request_id = %get_request_id(),
                    "Using {} provider",
                    protocol
                );
                self.call_upstream(protocol, api_key, model, request.prompt(), credentials.timeout)
                    .await
            }
            ProviderSelection::Stub => {
                tracing::info!(
                    provider = "stub",
                    request_id = %get_request_id(),
                    "No provider credentials configured, returning stub response"
                );
                get_metrics()
                    .completions
                    .with_label_values(&[Provider::Stub.as_str(), OUTCOME_SUCCESS])
                    .inc();
                CompletionResult::stub()
            }
        }
    }

    async fn call_upstream(
        &self,
        protocol: Protocol,
        api_key: &str,
        model: &str,
        prompt: &str,
        timeout: Duration,
    ) -> CompletionResult {
        let provider = Provider::from(protocol);
        tracing::debug!(
            provider = %provider,
            prompt_length = prompt.chars().count(),
            prompt_hash = %prompt_hash_prefix(prompt),
            "Sending completion request"
        );

        let url = format!("{}{}", self.api_base(protocol), protocol.endpoint_path());
        let payload = CompletionPayload::single_user_message(model, prompt);
        let request = match protocol {
            Protocol::OpenAI => build_upstream_request(
                &self.http_client,
                &url,
                &payload,
                UpstreamAuth::Bearer(api_key),
                None,
            ),
            Protocol::Anthropic => build_upstream_request(
                &self.http_client,
                &url,
                &payload,
                UpstreamAuth::XApiKey(api_key),
                Some(ANTHROPIC_VERSION),
            ),
        };

        let start = Instant::now();
        let outcome = send_upstream(request, timeout).await;
        let metrics = get_metrics();
        metrics
            .provider_latency
            .with_label_values(&[provider.as_str()])
            .observe(start.elapsed().as_secs_f64());

        match interpret_outcome(protocol, outcome) {
            Ok(output) => {
                metrics
                    .completions
                    .with_label_values(&[provider.as_str(), OUTCOME_SUCCESS])
                    .inc();
                CompletionResult::success(provider, model, output)
            }
            Err(failure) => {
                metrics
                    .completions
                    .with_label_values(&[provider.as_str(), failure.category().as_str()])
                    .inc();
                CompletionResult::failure(provider, model, failure.to_string())
            }
        }
    }

    fn api_base(&self, protocol: Protocol) -> &str {
        match protocol {
            Protocol::OpenAI => &self.openai_api_base,
            Protocol::Anthropic => &self.anthropic_api_base,
        }
    }
}

/// Header in which each provider reports its own request ID.
fn upstream_request_id_header(protocol: Protocol) -> &'static str {
    match protocol {
        Protocol::OpenAI => "x-request-id",
        Protocol::Anthropic => "request-id",
    }
}

/// Turn a raw upstream outcome into completion text or a failure, logging
/// each failure once under the inbound request ID.
fn interpret_outcome(
    protocol: Protocol,
    outcome: UpstreamOutcome,
) -> std::result::Result<String, UpstreamFailure> {
    let request_id = get_request_id();
    match outcome {
        UpstreamOutcome::Timeout => {
            tracing::error!(provider = %protocol, request_id = %request_id, "{} request timed out", protocol);
            Err(UpstreamFailure::Timeout)
        }
        UpstreamOutcome::Transport(cause) => {
            tracing::error!(
                provider = %protocol,
                request_id = %request_id,
                error = %cause,
                "{} request failed",
                protocol
            );
            Err(UpstreamFailure::Transport(cause))
        }
        UpstreamOutcome::Response {
            status,
            headers,
            body,
        } if !(200..300).contains(&status) => {
            let upstream_request_id = headers
                .get(upstream_request_id_header(protocol))
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-");
            tracing::error!(
                provider = %protocol,
                request_id = %request_id,
                status = status,
                upstream_request_id = %upstream_request_id,
                upstream_message = %describe_error_body(&body),
                "{} API error",
                protocol
            );
            Err(UpstreamFailure::HttpStatus { protocol, status })
        }
        UpstreamOutcome::Response { body, .. } => match protocol.parse_response(&body) {
            Ok(Some(output)) => Ok(output),
            Ok(None) => {
                tracing::warn!(provider = %protocol, request_id = %request_id, "{} returned empty response", protocol);
                Err(UpstreamFailure::EmptyResponse { protocol })
            }
            Err(e) => {
                tracing::error!(
                    provider = %protocol,
                    request_id = %request_id,
                    error = %e,
                    "Failed to parse {} response",
                    protocol
                );
                Err(UpstreamFailure::Parse(e))
            }
        },
    }
}
