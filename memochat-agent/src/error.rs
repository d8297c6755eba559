//! Errors surfaced to the person asking a question

use memochat_providers::ProviderError;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    /// Nothing was asked. No state changes.
    #[error("Please provide a question.")]
    EmptyInput,

    /// Model id or sampling parameters outside the accepted set. No state changes.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// The completion call failed. The question stays in the transcript.
    #[error("Generation failed: {0}")]
    Generation(#[from] ProviderError),

    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Generation cancelled")]
    Cancelled,
}

impl ChatError {
    /// Whether the request reached the provider stage.
    ///
    /// When true the user turn has already been recorded.
    pub fn is_generation_failure(&self) -> bool {
        matches!(
            self,
            ChatError::Generation(_) | ChatError::Timeout(_) | ChatError::Cancelled
        )
    }
}
