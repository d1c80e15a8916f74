//! Summarizer port - Interface to the external summarization collaborator

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Raw answer from the summarizer
#[derive(Debug, Clone)]
pub struct SummaryResponse {
    /// Generated content, expected to be a JSON document
    pub content: String,
    /// Model used for generation
    pub model: String,
    /// Number of tokens used (if available)
    pub tokens_used: Option<u32>,
    /// Latency in milliseconds
    pub latency_ms: u64,
}

/// Port for structured-JSON summarization
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SummarizerPort: Send + Sync {
    /// Ask for a JSON answer to `prompt` under `system_prompt`
    async fn summarize(
        &self,
        system_prompt: &str,
        prompt: &str,
    ) -> Result<SummaryResponse, ApplicationError>;

    /// Check if the backend is reachable
    async fn is_healthy(&self) -> bool;

    /// Name of the model answering requests
    fn current_model(&self) -> String;
}
