//! Logging setup and request-scoped logging context.
//!
//! The request ID lives in task-local storage so that logs emitted deep inside
//! the dispatcher can be correlated with the inbound request without threading
//! the ID through every call.

use crate::core::config::AppInfoConfig;
use chrono::Local;
use sha2::{Digest, Sha256};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

tokio::task_local! {
    /// Task-local storage for the current request ID.
    pub static REQUEST_ID: String;
}

/// Get the current request ID from context, if set.
///
/// Returns an empty string if no request ID is set.
pub fn get_request_id() -> String {
    REQUEST_ID.try_with(|id| id.clone()).unwrap_or_default()
}

/// Generate a new unique request ID using UUID v4.
pub fn generate_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// First 8 hex characters of the prompt's SHA-256.
///
/// Lets operators correlate log lines for the same prompt without the prompt
/// text ever being written to the logs.
///
/// # Examples
///
/// ```
/// use ona_llm_backend::core::logging::prompt_hash_prefix;
///
/// assert_eq!(prompt_hash_prefix("hello"), "2cf24dba");
/// ```
pub fn prompt_hash_prefix(prompt: &str) -> String {
    let digest = Sha256::digest(prompt.as_bytes());
    hex::encode(&digest[..4])
}

/// Custom time formatter that uses local timezone (respects TZ environment variable)
struct LocalTime;

impl tracing_subscriber::fmt::time::FormatTime for LocalTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        let now = Local::now();
        write!(w, "{}", now.format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Translate a conventional level name into a tracing filter level.
///
/// Accepts the names operators tend to already have in their `.env` files
/// (`WARNING`, `CRITICAL`) alongside tracing's own.
pub fn level_directive(level: &str) -> &'static str {
    match level.trim().to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" | "critical" | "fatal" => "error",
        _ => "info",
    }
}

/// Build the filter string used when `RUST_LOG` is not set.
pub fn default_filter(app: &AppInfoConfig) -> String {
    let level = if app.debug {
        "debug"
    } else {
        level_directive(&app.log_level)
    };
    format!("{},ona_llm_backend={}", level, level)
}

/// Install the global tracing subscriber.
pub fn init_tracing(app: &AppInfoConfig) {
    let base_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter(app));

    // Always suppress noisy HTTP library logs regardless of RUST_LOG setting
    let filter = EnvFilter::new(format!(
        "{},hyper=warn,hyper::proto=warn,h2=warn,reqwest=warn",
        base_filter
    ));

    let no_color = std::env::var("NO_COLOR").is_ok();

    if app.log_format.eq_ignore_ascii_case("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_timer(LocalTime)
                    .with_current_span(false),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_timer(LocalTime)
                    .with_ansi(!no_color),
            )
            .init();
    }
}
