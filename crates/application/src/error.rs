//! Application-level errors

use domain::{DomainError, RejectionCode};
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Malformed request shape
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Submission refused by the moderation gate
    #[error("Moderation blocked ({code}): {message}")]
    ModerationBlocked {
        code: RejectionCode,
        message: String,
        warnings: Vec<String>,
    },

    /// Requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Stage text missing or unreadable
    #[error("Diff computation failed: {0}")]
    DiffComputation(String),

    /// Diff exceeded its time budget
    #[error("Diff computation timed out after {budget_ms}ms")]
    DiffTimeout { budget_ms: u64 },

    /// Texts too large for the configured comparison table
    #[error("Texts too large to compare: {0}")]
    DiffTooLarge(String),

    /// Summarizer response failed schema validation
    #[error("Analysis format error: {0}")]
    AnalysisFormat(String),

    /// Summarizer did not answer within the attempt timeout
    #[error("Analysis timed out after {timeout_ms}ms")]
    AnalysisTimeout { timeout_ms: u64 },

    /// External service error
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Caller went away before the operation finished
    #[error("Operation cancelled")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Check if this error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ExternalService(_)
                | Self::AnalysisFormat(_)
                | Self::AnalysisTimeout { .. }
                | Self::DiffTimeout { .. }
        )
    }
}
