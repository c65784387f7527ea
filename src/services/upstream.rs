//! Outbound provider request execution.
//!
//! Builds the single POST sent to a provider and runs it under a deadline.
//! Transport problems come back as an [`UpstreamOutcome`] value, never as an
//! error, so the dispatcher decides what each one means.

use reqwest::header::{HeaderMap, CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Authentication mode for upstream provider request.
#[derive(Clone, Copy)]
pub enum UpstreamAuth<'a> {
    Bearer(&'a str),
    XApiKey(&'a str),
}

/// What came back from one upstream exchange.
#[derive(Debug)]
pub enum UpstreamOutcome {
    /// The provider answered; any status code, body fully read.
    Response {
        status: u16,
        headers: HeaderMap,
        body: bytes::Bytes,
    },
    /// The deadline passed before the exchange finished.
    Timeout,
    /// Connection, TLS, or protocol failure before a full response arrived.
    Transport(String),
}

/// Build a provider request with unified auth and optional Anthropic version header.
pub fn build_upstream_request<T: Serialize + ?Sized>(
    http_client: &reqwest::Client,
    url: &str,
    payload: &T,
    auth: UpstreamAuth<'_>,
    anthropic_version: Option<&str>,
) -> reqwest::RequestBuilder {
    let mut request = http_client
        .post(url)
        .header(CONTENT_TYPE, "application/json");

    request = match auth {
        UpstreamAuth::Bearer(api_key) => {
            request.header("Authorization", format!("Bearer {}", api_key))
        }
        UpstreamAuth::XApiKey(api_key) => request.header("x-api-key", api_key),
    };

    if let Some(version) = anthropic_version {
        request = request.header("anthropic-version", version);
    }

    request.json(payload)
}

/// Send the request and read the whole body, all within `timeout`.
///
/// Dropping the returned future abandons the in-flight request.
pub async fn send_upstream(request: reqwest::RequestBuilder, timeout: Duration) -> UpstreamOutcome {
    let exchange = async {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok::<_, reqwest::Error>((status, headers, body))
    };

    match tokio::time::timeout(timeout, exchange).await {
        Ok(Ok((status, headers, body))) => UpstreamOutcome::Response {
            status,
            headers,
            body,
        },
        Ok(Err(e)) if e.is_timeout() => UpstreamOutcome::Timeout,
        Ok(Err(e)) => UpstreamOutcome::Transport(e.to_string()),
        Err(_) => UpstreamOutcome::Timeout,
    }
}

/// Shorten a message for logging.
pub fn truncate_message(message: &str) -> String {
    let mut chars = message.chars();
    let truncated: String = chars.by_ref().take(MAX_ERROR_MESSAGE_LEN).collect();
    if chars.next().is_some() {
        format!("{}...", truncated)
    } else {
        truncated
    }
}

/// Extract canonical error message from provider error payload.
pub fn extract_error_message(body: &Value) -> Option<String> {
    body.get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .map(|s| s.to_string())
        .or_else(|| {
            body.get("error")
                .and_then(|e| e.as_str())
                .map(|s| s.to_string())
        })
        .or_else(|| {
            body.get("message")
                .and_then(|m| m.as_str())
                .map(|s| s.to_string())
        })
}

/// Best-effort description of an error body for logs: the provider's own
/// message when the body is structured, otherwise the raw text.
pub fn describe_error_body(body: &[u8]) -> String {
    let message = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|json| extract_error_message(&json))
        .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned());
    truncate_message(&message)
}
