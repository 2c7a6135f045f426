//! Completion client abstraction.
//!
//! Panels and the agent only see this trait; the HTTP implementation lives in
//! the `providers` crate and tests substitute scripted clients.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Transport(String),

    #[error("completion endpoint returned HTTP {0}")]
    Status(u16),

    #[error("malformed completion response: {0}")]
    MalformedResponse(String),
}

/// Turns one fully rendered prompt into one completion.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}
