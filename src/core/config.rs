//! Configuration management for the backend.
//!
//! Settings are read from the process environment (the binary seeds it from a
//! `.env` file when one exists) exactly once at startup and assembled into an
//! immutable [`AppConfig`]. Handlers and the completion dispatcher receive the
//! pieces they need explicitly; nothing reads the environment afterwards.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-latest";
pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_ANTHROPIC_API_BASE: &str = "https://api.anthropic.com/v1";

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Application metadata reported by `/health` and `/info`
    pub app: AppInfoConfig,

    /// Server configuration (host, port, request timeout)
    pub server: ServerConfig,

    /// Provider credentials, models and limits
    pub llm: LlmConfig,
}

/// Application metadata and logging preferences.
#[derive(Debug, Clone)]
pub struct AppInfoConfig {
    pub name: String,
    pub version: String,
    pub environment: String,
    pub debug: bool,
    pub log_level: String,
    /// `text` or `json`
    pub log_format: String,
}

/// Server-specific configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Upper bound on handling a single inbound request
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// LLM provider configuration.
#[derive(Clone)]
pub struct LlmConfig {
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub openai_model: String,
    pub anthropic_model: String,
    pub openai_api_base: String,
    pub anthropic_api_base: String,
    /// Timeout applied to each outbound provider call
    pub timeout: Duration,
    /// Maximum prompt length in characters
    pub max_prompt_length: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            anthropic_api_key: None,
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            anthropic_model: DEFAULT_ANTHROPIC_MODEL.to_string(),
            openai_api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            anthropic_api_base: DEFAULT_ANTHROPIC_API_BASE.to_string(),
            timeout: Duration::from_secs_f64(default_llm_timeout()),
            max_prompt_length: default_max_prompt_length(),
        }
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("openai_api_key", &self.openai_api_key.as_deref().map(key_preview))
            .field(
                "anthropic_api_key",
                &self.anthropic_api_key.as_deref().map(key_preview),
            )
            .field("openai_model", &self.openai_model)
            .field("anthropic_model", &self.anthropic_model)
            .field("openai_api_base", &self.openai_api_base)
            .field("anthropic_api_base", &self.anthropic_api_base)
            .field("timeout", &self.timeout)
            .field("max_prompt_length", &self.max_prompt_length)
            .finish()
    }
}

impl LlmConfig {
    /// Take a read-only snapshot of the credentials used for one dispatch.
    pub fn credentials(&self) -> ProviderCredentials {
        ProviderCredentials {
            openai_key: self.openai_api_key.clone(),
            anthropic_key: self.anthropic_api_key.clone(),
            openai_model: self.openai_model.clone(),
            anthropic_model: self.anthropic_model.clone(),
            timeout: self.timeout,
        }
    }
}

/// Credentials and model choices handed to the dispatcher for a single call.
#[derive(Clone, PartialEq)]
pub struct ProviderCredentials {
    pub openai_key: Option<String>,
    pub anthropic_key: Option<String>,
    pub openai_model: String,
    pub anthropic_model: String,
    pub timeout: Duration,
}

impl ProviderCredentials {
    /// OpenAI key, if set to something other than blanks.
    pub fn openai_key(&self) -> Option<&str> {
        non_blank(self.openai_key.as_deref())
    }

    /// Anthropic key, if set to something other than blanks.
    pub fn anthropic_key(&self) -> Option<&str> {
        non_blank(self.anthropic_key.as_deref())
    }
}

impl Default for ProviderCredentials {
    fn default() -> Self {
        LlmConfig::default().credentials()
    }
}

impl fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("openai_key", &self.openai_key.as_deref().map(key_preview))
            .field("anthropic_key", &self.anthropic_key.as_deref().map(key_preview))
            .field("openai_model", &self.openai_model)
            .field("anthropic_model", &self.anthropic_model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Create a preview of a secret (e.g., "sk-***abc").
pub fn key_preview(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 6 {
        return "***".to_string();
    }
    let prefix: String = chars[..3].iter().collect();
    let suffix: String = chars[chars.len() - 3..].iter().collect();
    format!("{}***{}", prefix, suffix)
}

/// Flat view of the environment, one field per variable (names lowercased).
#[derive(Deserialize)]
struct EnvSettings {
    #[serde(default = "default_app_name")]
    app_name: String,
    #[serde(default = "default_app_version")]
    app_version: String,
    #[serde(default = "default_env")]
    env: String,
    #[serde(default)]
    debug: bool,
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default = "default_log_format")]
    log_format: String,

    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_request_timeout")]
    request_timeout_secs: u64,

    #[serde(default)]
    openai_api_key: Option<String>,
    #[serde(default)]
    anthropic_api_key: Option<String>,
    #[serde(default = "default_openai_model")]
    openai_model: String,
    #[serde(default = "default_anthropic_model")]
    anthropic_model: String,
    #[serde(default = "default_openai_api_base")]
    openai_api_base: String,
    #[serde(default = "default_anthropic_api_base")]
    anthropic_api_base: String,
    #[serde(default = "default_llm_timeout")]
    llm_timeout: f64,
    #[serde(default = "default_max_prompt_length")]
    max_prompt_length: usize,
}

fn default_app_name() -> String {
    "Ona FastAPI Backend".to_string()
}

fn default_app_version() -> String {
    "1.0.0".to_string()
}

fn default_env() -> String {
    "development".to_string()
}

fn default_log_level() -> String {
    "INFO".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_request_timeout() -> u64 {
    60
}

fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.to_string()
}

fn default_anthropic_model() -> String {
    DEFAULT_ANTHROPIC_MODEL.to_string()
}

fn default_openai_api_base() -> String {
    DEFAULT_OPENAI_API_BASE.to_string()
}

fn default_anthropic_api_base() -> String {
    DEFAULT_ANTHROPIC_API_BASE.to_string()
}

fn default_llm_timeout() -> f64 {
    30.0
}

fn default_max_prompt_length() -> usize {
    4000
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ona_llm_backend::core::config::AppConfig;
    ///
    /// let config = AppConfig::from_env().expect("Failed to load config");
    /// ```
    pub fn from_env() -> Result<Self> {
        Self::from_source(None)
    }

    /// Load configuration from an explicit set of variables instead of the
    /// process environment. Unset variables take their defaults.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: config::Map<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::from_source(Some(map))
    }

    fn from_source(source: Option<config::Map<String, String>>) -> Result<Self> {
        let settings: EnvSettings = config::Config::builder()
            .add_source(config::Environment::default().source(source))
            .build()
            .context("Failed to read configuration from environment")?
            .try_deserialize()
            .context("Failed to parse configuration")?;

        settings.try_into()
    }
}

impl TryFrom<EnvSettings> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(settings: EnvSettings) -> Result<Self> {
        if !settings.llm_timeout.is_finite() || settings.llm_timeout <= 0.0 {
            bail!(
                "LLM_TIMEOUT must be a positive number of seconds, got {}",
                settings.llm_timeout
            );
        }
        let llm_timeout = Duration::try_from_secs_f64(settings.llm_timeout)
            .with_context(|| format!("LLM_TIMEOUT {} is out of range", settings.llm_timeout))?;
        if settings.max_prompt_length == 0 {
            bail!("MAX_PROMPT_LENGTH must be at least 1");
        }

        Ok(Self {
            app: AppInfoConfig {
                name: settings.app_name,
                version: settings.app_version,
                environment: settings.env,
                debug: settings.debug,
                log_level: settings.log_level,
                log_format: settings.log_format,
            },
            server: ServerConfig {
                host: settings.host,
                port: settings.port,
                request_timeout_secs: settings.request_timeout_secs,
            },
            llm: LlmConfig {
                openai_api_key: settings
                    .openai_api_key
                    .filter(|k| !k.trim().is_empty()),
                anthropic_api_key: settings
                    .anthropic_api_key
                    .filter(|k| !k.trim().is_empty()),
                openai_model: settings.openai_model,
                anthropic_model: settings.anthropic_model,
                openai_api_base: settings.openai_api_base.trim_end_matches('/').to_string(),
                anthropic_api_base: settings
                    .anthropic_api_base
                    .trim_end_matches('/')
                    .to_string(),
                timeout: llm_timeout,
                max_prompt_length: settings.max_prompt_length,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn empty() -> Vec<(&'static str, &'static str)> {
        vec![]
    }

    #[test]
    fn test_default_values() {
        let config = AppConfig::from_vars(empty()).unwrap();

        assert_eq!(config.app.name, "Ona FastAPI Backend");
        assert_eq!(config.app.version, "1.0.0");
        assert_eq!(config.app.environment, "development");
        assert_eq!(config.app.log_level, "INFO");
        assert!(!config.app.debug);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert!(config.llm.openai_api_key.is_none());
        assert!(config.llm.anthropic_api_key.is_none());
        assert_eq!(config.llm.openai_model, "gpt-4o-mini");
        assert_eq!(config.llm.anthropic_model, "claude-3-5-sonnet-latest");
        assert_eq!(config.llm.timeout, Duration::from_secs(30));
        assert_eq!(config.llm.max_prompt_length, 4000);
    }

    #[test]
    fn test_loads_variables() {
        let config = AppConfig::from_vars([
            ("APP_NAME", "Test App"),
            ("APP_VERSION", "2.0.0"),
            ("LOG_LEVEL", "DEBUG"),
            ("ENV", "production"),
            ("PORT", "9000"),
            ("DEBUG", "true"),
            ("OPENAI_API_KEY", "test-openai-key"),
            ("ANTHROPIC_API_KEY", "test-anthropic-key"),
            ("LLM_TIMEOUT", "2.5"),
            ("MAX_PROMPT_LENGTH", "100"),
        ])
        .unwrap();

        assert_eq!(config.app.name, "Test App");
        assert_eq!(config.app.version, "2.0.0");
        assert_eq!(config.app.log_level, "DEBUG");
        assert_eq!(config.app.environment, "production");
        assert!(config.app.debug);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.llm.openai_api_key.as_deref(), Some("test-openai-key"));
        assert_eq!(
            config.llm.anthropic_api_key.as_deref(),
            Some("test-anthropic-key")
        );
        assert_eq!(config.llm.timeout, Duration::from_millis(2500));
        assert_eq!(config.llm.max_prompt_length, 100);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = AppConfig::from_vars([("OPENAI_API_KEY", "my-api-key")]).unwrap();

        assert_eq!(config.llm.openai_api_key.as_deref(), Some("my-api-key"));
        assert_eq!(config.app.name, "Ona FastAPI Backend");
        assert_eq!(config.app.environment, "development");
    }

    #[test]
    fn test_blank_keys_are_unset() {
        let config =
            AppConfig::from_vars([("OPENAI_API_KEY", ""), ("ANTHROPIC_API_KEY", "   ")]).unwrap();

        assert!(config.llm.openai_api_key.is_none());
        assert!(config.llm.anthropic_api_key.is_none());
    }

    #[test]
    fn test_api_base_trailing_slash_trimmed() {
        let config = AppConfig::from_vars([("OPENAI_API_BASE", "http://localhost:9999/v1/")]).unwrap();
        assert_eq!(config.llm.openai_api_base, "http://localhost:9999/v1");
    }

    #[test]
    fn test_rejects_non_positive_timeout() {
        assert!(AppConfig::from_vars([("LLM_TIMEOUT", "0")]).is_err());
        assert!(AppConfig::from_vars([("LLM_TIMEOUT", "-3")]).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_timeout() {
        let err = AppConfig::from_vars([("LLM_TIMEOUT", "1e30")]).unwrap_err();
        assert!(err.to_string().contains("LLM_TIMEOUT"));
    }

    #[test]
    fn test_rejects_zero_prompt_length() {
        assert!(AppConfig::from_vars([("MAX_PROMPT_LENGTH", "0")]).is_err());
    }

    #[test]
    fn test_rejects_invalid_port() {
        assert!(AppConfig::from_vars([("PORT", "not-a-port")]).is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_reads_process_environment() {
        unsafe {
            std::env::set_var("ANTHROPIC_MODEL", "claude-test-model");
        }

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.llm.anthropic_model, "claude-test-model");

        unsafe {
            std::env::remove_var("ANTHROPIC_MODEL");
        }
    }

    #[test]
    fn test_credentials_snapshot() {
        let config = AppConfig::from_vars([
            ("OPENAI_API_KEY", "sk-openai"),
            ("OPENAI_MODEL", "gpt-test"),
        ])
        .unwrap();

        let credentials = config.llm.credentials();
        assert_eq!(credentials.openai_key(), Some("sk-openai"));
        assert_eq!(credentials.anthropic_key(), None);
        assert_eq!(credentials.openai_model, "gpt-test");
        assert_eq!(credentials.timeout, config.llm.timeout);
    }

    #[test]
    fn test_credentials_blank_key_treated_as_unset() {
        let credentials = ProviderCredentials {
            openai_key: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(credentials.openai_key(), None);
    }

    #[test]
    fn test_debug_masks_keys() {
        let credentials = ProviderCredentials {
            openai_key: Some("sk-secret-value-123".to_string()),
            ..Default::default()
        };
        let rendered = format!("{:?}", credentials);
        assert!(!rendered.contains("secret-value"));
        assert!(rendered.contains("sk-***123"));
    }

    #[test]
    fn test_key_preview() {
        assert_eq!(key_preview("short"), "***");
        assert_eq!(key_preview("sk-abcdefxyz"), "sk-***xyz");
    }
}
