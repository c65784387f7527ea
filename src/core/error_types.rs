//! Shared constants for structured API errors and upstream failure categories.

use std::fmt;

pub const ERROR_TYPE_API: &str = "api_error";
pub const ERROR_TYPE_INVALID_REQUEST: &str = "invalid_request_error";
pub const ERROR_TYPE_TIMEOUT: &str = "timeout_error";

pub const ERROR_CATEGORY_PROVIDER_4XX: &str = "provider_4xx";
pub const ERROR_CATEGORY_PROVIDER_5XX: &str = "provider_5xx";
pub const ERROR_CATEGORY_PROVIDER_UNEXPECTED_STATUS: &str = "provider_unexpected_status";
pub const ERROR_CATEGORY_TIMEOUT: &str = "timeout";
pub const ERROR_CATEGORY_NETWORK_ERROR: &str = "network_error";
pub const ERROR_CATEGORY_PARSE_ERROR: &str = "parse_error";
pub const ERROR_CATEGORY_EMPTY_RESPONSE: &str = "empty_response";

/// Outcome label recorded for a completion that produced output.
pub const OUTCOME_SUCCESS: &str = "success";

/// Why an upstream provider call did not yield a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategoryCode {
    Provider4xx,
    Provider5xx,
    /// Informational or redirect status where a 2xx was expected
    ProviderUnexpectedStatus,
    Timeout,
    NetworkError,
    ParseError,
    EmptyResponse,
}

impl ErrorCategoryCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Provider4xx => ERROR_CATEGORY_PROVIDER_4XX,
            Self::Provider5xx => ERROR_CATEGORY_PROVIDER_5XX,
            Self::ProviderUnexpectedStatus => ERROR_CATEGORY_PROVIDER_UNEXPECTED_STATUS,
            Self::Timeout => ERROR_CATEGORY_TIMEOUT,
            Self::NetworkError => ERROR_CATEGORY_NETWORK_ERROR,
            Self::ParseError => ERROR_CATEGORY_PARSE_ERROR,
            Self::EmptyResponse => ERROR_CATEGORY_EMPTY_RESPONSE,
        }
    }

    /// Categorize a non-success upstream status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            400..=499 => Self::Provider4xx,
            500..=599 => Self::Provider5xx,
            _ => Self::ProviderUnexpectedStatus,
        }
    }
}

impl fmt::Display for ErrorCategoryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
