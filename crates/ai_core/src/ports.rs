//! Inference engine port and its request/response types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::InferenceError;

/// Speaker of a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One turn of a chat conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceMessage {
    pub role: ChatRole,
    pub content: String,
}

impl InferenceMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Chat completion request
///
/// Unset options fall back to the engine's [`InferenceConfig`](crate::InferenceConfig).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InferenceRequest {
    pub messages: Vec<InferenceMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Answer must be a single JSON document
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub json_output: bool,
}

impl InferenceRequest {
    pub fn simple(user_message: impl Into<String>) -> Self {
        Self {
            messages: vec![InferenceMessage::user(user_message)],
            ..Self::default()
        }
    }

    pub fn with_system(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            messages: vec![InferenceMessage::system(system), InferenceMessage::user(user)],
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn json(mut self) -> Self {
        self.json_output = true;
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Token counts reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl TokenUsage {
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.prompt_tokens.saturating_add(self.completion_tokens)
    }
}

/// Completed generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceResponse {
    pub content: String,
    /// Model that actually answered
    pub model: String,
    pub usage: Option<TokenUsage>,
    pub finish_reason: Option<String>,
}

impl InferenceResponse {
    /// Zero when the server did not report usage
    #[must_use]
    pub fn total_tokens(&self) -> u32 {
        self.usage.map_or(0, |u| u.total())
    }
}

/// Text generation backend
#[async_trait]
pub trait InferenceEngine: Send + Sync {
    async fn generate(&self, request: InferenceRequest) -> Result<InferenceResponse, InferenceError>;

    /// `Ok(false)` when the server is down or unreachable
    async fn health_check(&self) -> Result<bool, InferenceError>;

    async fn list_models(&self) -> Result<Vec<String>, InferenceError>;

    fn default_model(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_system_puts_instructions_first() {
        let req = InferenceRequest::with_system("Jesteś analitykiem", "Oto diff");
        assert_eq!(
            req.messages,
            vec![
                InferenceMessage::system("Jesteś analitykiem"),
                InferenceMessage::user("Oto diff")
            ]
        );
        assert!(!req.json_output);
    }

    #[test]
    fn builder_options() {
        let req = InferenceRequest::simple("x")
            .json()
            .with_temperature(0.0)
            .with_max_tokens(64);
        assert!(req.json_output);
        assert_eq!(req.temperature, Some(0.0));
        assert_eq!(req.max_tokens, Some(64));
    }

    #[test]
    fn roles_serialize_lowercase() {
        let json = serde_json::to_string(&InferenceMessage::system("s")).unwrap();
        assert_eq!(json, r#"{"role":"system","content":"s"}"#);
    }

    #[test]
    fn unset_options_are_not_serialized() {
        let json = serde_json::to_string(&InferenceRequest::simple("Test")).unwrap();
        assert!(!json.contains("model"));
        assert!(!json.contains("json_output"));
        assert!(!json.contains("temperature"));
    }

    #[test]
    fn usage_totals() {
        let resp = InferenceResponse {
            content: "{}".into(),
            model: "m".into(),
            usage: None,
            finish_reason: None,
        };
        assert_eq!(resp.total_tokens(), 0);

        let resp = InferenceResponse {
            usage: Some(TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 5,
            }),
            ..resp
        };
        assert_eq!(resp.total_tokens(), 15);
    }
}
