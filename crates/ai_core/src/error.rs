//! Inference errors

use thiserror::Error;

/// Errors that can occur while talking to the inference server
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Failed to connect to the inference server
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request could not be sent or completed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Model not found or not loaded
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Response body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Timeout during inference
    #[error("Inference timeout")]
    Timeout,

    /// Server answered with a non-success status
    #[error("Server error: {0}")]
    ServerError(String),

    /// Client construction failed
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl InferenceError {
    /// Whether a later attempt may succeed
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_) | Self::Timeout | Self::ServerError(_) | Self::RequestFailed(_)
        )
    }
}

impl From<reqwest::Error> for InferenceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(InferenceError::Timeout.is_transient());
        assert!(InferenceError::ServerError("502".into()).is_transient());
        assert!(!InferenceError::ModelNotAvailable("x".into()).is_transient());
        assert!(!InferenceError::InvalidResponse("x".into()).is_transient());
        assert!(!InferenceError::Configuration("x".into()).is_transient());
    }

    #[test]
    fn display_includes_detail() {
        let err = InferenceError::ModelNotAvailable("qwen".into());
        assert_eq!(err.to_string(), "Model not available: qwen");
    }
}
