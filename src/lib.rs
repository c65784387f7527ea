//! Ona LLM Backend - a thin HTTP service in front of hosted LLM providers.
//!
//! The service exposes three endpoints:
//!
//! - `GET /health`: liveness, version and uptime
//! - `GET /info`: application metadata and configured providers
//! - `POST /llm`: single-prompt completion
//!
//! Completions go to exactly one provider, chosen by which credential is
//! configured: OpenAI first, then Anthropic, otherwise a deterministic stub.
//! Provider failures are reported in the response body rather than as HTTP
//! errors.
//!
//! # Architecture
//!
//! - [`core`]: configuration, errors, logging, metrics, middleware
//! - [`transformer`]: provider request bodies and response parsing
//! - [`services`]: provider selection and the outbound call
//! - [`api`]: HTTP handlers, wire models, OpenAPI docs, router
//!
//! # Configuration
//!
//! All settings come from environment variables (a `.env` file is loaded by
//! the binary if present). The most relevant:
//! - `OPENAI_API_KEY` / `ANTHROPIC_API_KEY`: provider credentials
//! - `OPENAI_MODEL` / `ANTHROPIC_MODEL`: model identifiers
//! - `LLM_TIMEOUT`: outbound call timeout in seconds (default: 30)
//! - `MAX_PROMPT_LENGTH`: prompt bound in characters (default: 4000)
//! - `HOST` / `PORT`: bind address (default: 0.0.0.0:8000)

pub mod api;
pub mod core;
pub mod services;
pub mod transformer;

pub use api::{build_router, ApiDoc, AppState};
pub use core::{AppConfig, AppError, ProviderCredentials, Result};
pub use services::{CompletionDispatcher, CompletionRequest, CompletionResult, Provider};
