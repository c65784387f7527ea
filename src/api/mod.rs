//! HTTP layer: handlers, wire models, OpenAPI docs and the router.

pub mod docs;
pub mod handlers;
pub mod models;

pub use docs::ApiDoc;
pub use handlers::{health, info, llm_completion, metrics_handler, AppState};
pub use models::{ApiErrorDetail, ApiErrorResponse, HealthResponse, InfoResponse, LlmRequest};

use crate::core::{
    request_id_middleware, request_timeout_middleware, AppError, MetricsMiddleware,
};
use axum::{
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Build the application router with all endpoints and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    let request_timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    let swagger_ui = SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi());

    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/info", get(info))
        .route("/llm", post(llm_completion))
        .layer(axum::middleware::from_fn(MetricsMiddleware::track_metrics))
        .with_state(state);

    Router::new()
        .merge(swagger_ui)
        .merge(api_routes)
        .route("/metrics", get(metrics_handler))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(axum::middleware::from_fn_with_state(
            request_timeout,
            request_timeout_middleware,
        ))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Turn a handler panic into the standard 500 error body.
fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "Handler panicked");

    AppError::Internal("unexpected server error".to_string()).into_response()
}
