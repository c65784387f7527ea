//! Service layer: provider selection and the outbound completion call.

pub mod completion_service;
pub mod upstream;

pub use completion_service::{
    CompletionDispatcher, CompletionRequest, CompletionResult, Provider, ValidationError,
};
