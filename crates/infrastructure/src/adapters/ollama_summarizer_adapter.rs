//! Summarizer adapter - implements `SummarizerPort` on top of ai_core
//!
//! Every call is a single JSON-mode chat request. Retries and the overall
//! time budget belong to the `AnalysisOrchestrator`, not to this adapter.

use std::time::Instant;

use ai_core::{InferenceConfig, InferenceEngine, InferenceError, InferenceRequest, OllamaInferenceEngine};
use application::{
    error::ApplicationError,
    ports::{SummarizerPort, SummaryResponse},
};
use async_trait::async_trait;
use tracing::{debug, instrument, warn};

/// Adapter for Ollama-compatible summarization backends
#[derive(Debug)]
pub struct OllamaSummarizerAdapter {
    engine: OllamaInferenceEngine,
}

impl OllamaSummarizerAdapter {
    pub fn new(config: InferenceConfig) -> Result<Self, ApplicationError> {
        let engine = OllamaInferenceEngine::new(config).map_err(Self::map_error)?;
        Ok(Self { engine })
    }

    fn map_error(e: InferenceError) -> ApplicationError {
        match e {
            InferenceError::ModelNotAvailable(model) => {
                ApplicationError::Configuration(format!("Summarization model not available: {model}"))
            },
            InferenceError::Configuration(msg) => ApplicationError::Configuration(msg),
            InferenceError::Timeout => {
                ApplicationError::ExternalService("Summarization request timed out".to_string())
            },
            other => ApplicationError::ExternalService(format!("Summarization failed: {other}")),
        }
    }
}

#[async_trait]
impl SummarizerPort for OllamaSummarizerAdapter {
    #[instrument(skip(self, system_prompt, prompt), fields(prompt_len = prompt.len()))]
    async fn summarize(
        &self,
        system_prompt: &str,
        prompt: &str,
    ) -> Result<SummaryResponse, ApplicationError> {
        let start = Instant::now();
        let request = InferenceRequest::with_system(system_prompt, prompt).json();

        let response = self.engine.generate(request).await.map_err(|e| {
            warn!(error = %e, "Summarization request failed");
            Self::map_error(e)
        })?;

        #[allow(clippy::cast_possible_truncation)]
        let latency_ms = start.elapsed().as_millis() as u64;

        debug!(
            model = %response.model,
            tokens = ?response.usage.map(|u| u.total()),
            latency_ms,
            "Summarization completed"
        );

        Ok(SummaryResponse {
            tokens_used: response.usage.map(|u| u.total()),
            content: response.content,
            model: response.model,
            latency_ms,
        })
    }

    async fn is_healthy(&self) -> bool {
        match self.engine.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                warn!(error = %e, "Summarizer health check failed");
                false
            },
        }
    }

    fn current_model(&self) -> String {
        self.engine.default_model().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_retryable() {
        let err = OllamaSummarizerAdapter::map_error(InferenceError::Timeout);
        assert!(err.is_retryable());
    }

    #[test]
    fn server_error_is_retryable() {
        let err = OllamaSummarizerAdapter::map_error(InferenceError::ServerError("502".into()));
        assert!(matches!(err, ApplicationError::ExternalService(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn missing_model_is_configuration() {
        let err = OllamaSummarizerAdapter::map_error(InferenceError::ModelNotAvailable("x".into()));
        assert!(matches!(err, ApplicationError::Configuration(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn current_model_comes_from_config() {
        let adapter =
            OllamaSummarizerAdapter::new(InferenceConfig::default().with_model("bielik:11b")).unwrap();
        assert_eq!(adapter.current_model(), "bielik:11b");
    }
}
