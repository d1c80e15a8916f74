//! HTTP client for the Ollama chat API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, info, instrument, warn};

use crate::config::InferenceConfig;
use crate::error::InferenceError;
use crate::ports::{InferenceEngine, InferenceRequest, InferenceResponse, TokenUsage};

const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Request and response bodies of `/api/chat` and `/api/tags`
mod wire {
    use serde::{Deserialize, Serialize};

    use crate::ports::InferenceMessage;

    #[derive(Debug, Serialize)]
    pub struct ChatBody<'a> {
        pub model: &'a str,
        pub messages: &'a [InferenceMessage],
        pub stream: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub format: Option<&'static str>,
        pub options: Options,
    }

    #[derive(Debug, Serialize)]
    pub struct Options {
        pub temperature: f32,
        pub num_predict: u32,
        pub top_p: f32,
    }

    #[derive(Debug, Deserialize)]
    pub struct ChatReply {
        pub model: String,
        pub message: ReplyMessage,
        #[serde(default)]
        pub done: bool,
        pub done_reason: Option<String>,
        pub prompt_eval_count: Option<u32>,
        pub eval_count: Option<u32>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ReplyMessage {
        pub content: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct Tags {
        #[serde(default)]
        pub models: Vec<Tag>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Tag {
        pub name: String,
    }
}

/// Inference engine backed by an Ollama-compatible server
pub struct OllamaInferenceEngine {
    client: Client,
    config: InferenceConfig,
}

impl std::fmt::Debug for OllamaInferenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaInferenceEngine")
            .field("base_url", &self.config.base_url)
            .field("default_model", &self.config.default_model)
            .finish_non_exhaustive()
    }
}

impl OllamaInferenceEngine {
    pub fn new(config: InferenceConfig) -> Result<Self, InferenceError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| InferenceError::Configuration(e.to_string()))?;

        info!(
            base_url = %config.base_url,
            model = %config.default_model,
            json_mode = config.json_mode,
            "Ollama engine ready"
        );
        Ok(Self { client, config })
    }

    pub const fn config(&self) -> &InferenceConfig {
        &self.config
    }

    fn url(&self, endpoint: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        format!("{base}/api/{}", endpoint.trim_start_matches('/'))
    }

    fn model_for<'a>(&'a self, request: &'a InferenceRequest) -> &'a str {
        request.model.as_deref().unwrap_or(&self.config.default_model)
    }

    fn chat_body<'a>(&'a self, request: &'a InferenceRequest) -> wire::ChatBody<'a> {
        let json = request.json_output || self.config.json_mode;
        wire::ChatBody {
            model: self.model_for(request),
            messages: &request.messages,
            stream: false,
            format: json.then_some("json"),
            options: wire::Options {
                temperature: request.temperature.unwrap_or(self.config.temperature),
                num_predict: request.max_tokens.unwrap_or(self.config.max_tokens),
                top_p: self.config.top_p,
            },
        }
    }

    /// Turn a non-2xx chat response into the matching error
    async fn rejection(response: Response, model: &str) -> InferenceError {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return InferenceError::ModelNotAvailable(model.to_string());
        }
        let detail = response.text().await.unwrap_or_default();
        InferenceError::ServerError(format!("Status {status}: {detail}"))
    }
}

impl From<wire::ChatReply> for InferenceResponse {
    fn from(reply: wire::ChatReply) -> Self {
        let usage = reply
            .prompt_eval_count
            .zip(reply.eval_count)
            .map(|(prompt_tokens, completion_tokens)| TokenUsage {
                prompt_tokens,
                completion_tokens,
            });
        let finish_reason = match reply.done_reason {
            Some(reason) => Some(reason),
            None if reply.done => Some("stop".to_string()),
            None => None,
        };

        Self {
            content: reply.message.content,
            model: reply.model,
            usage,
            finish_reason,
        }
    }
}

#[async_trait]
impl InferenceEngine for OllamaInferenceEngine {
    #[instrument(skip_all, fields(model = %self.model_for(&request)))]
    async fn generate(&self, request: InferenceRequest) -> Result<InferenceResponse, InferenceError> {
        let body = self.chat_body(&request);
        debug!(turns = body.messages.len(), json = body.format.is_some(), "POST /api/chat");

        let response = self.client.post(self.url("chat")).json(&body).send().await?;
        if !response.status().is_success() {
            let err = Self::rejection(response, body.model).await;
            warn!(error = %err, "Chat request rejected");
            return Err(err);
        }

        let reply: wire::ChatReply = response
            .json()
            .await
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))?;
        let response = InferenceResponse::from(reply);
        debug!(tokens = response.total_tokens(), "Chat completed");
        Ok(response)
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<bool, InferenceError> {
        let probe = self
            .client
            .get(self.url("tags"))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await;

        match probe {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(e) if e.is_timeout() || e.is_connect() => Ok(false),
            Err(e) => Err(InferenceError::RequestFailed(e.to_string())),
        }
    }

    #[instrument(skip(self))]
    async fn list_models(&self) -> Result<Vec<String>, InferenceError> {
        let response = self.client.get(self.url("tags")).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(InferenceError::ServerError(status.to_string()));
        }

        let tags: wire::Tags = response
            .json()
            .await
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))?;
        Ok(tags.models.into_iter().map(|t| t.name).collect())
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }
}
