//! Core functionality shared by the HTTP layer and the dispatcher:
//! configuration, errors, logging, metrics and middleware.

pub mod config;
pub mod error;
pub mod error_types;
pub mod logging;
pub mod metrics;
pub mod middleware;

pub use config::{AppConfig, LlmConfig, ProviderCredentials, ServerConfig};
pub use error::{AppError, Result};
pub use metrics::{get_metrics, init_metrics, Metrics};
pub use middleware::{request_id_middleware, request_timeout_middleware, MetricsMiddleware};
