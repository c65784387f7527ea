//! OpenAPI document served at `/api-docs/openapi.json` and rendered by the
//! Swagger UI at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::health,
        crate::api::handlers::info,
        crate::api::handlers::llm_completion,
    ),
    components(
        schemas(
            crate::api::models::LlmRequest,
            crate::api::models::HealthResponse,
            crate::api::models::InfoResponse,
            crate::api::models::ApiErrorResponse,
            crate::api::models::ApiErrorDetail,
            crate::services::CompletionResult,
            crate::services::Provider,
        )
    ),
    tags(
        (name = "system", description = "Liveness and application metadata"),
        (name = "llm", description = "Single-prompt completion")
    ),
    info(
        title = "Ona LLM Backend API",
        version = "1.0.0",
        description = "Single-prompt completion backed by OpenAI, Anthropic, or a stub."
    )
)]
pub struct ApiDoc;
