//! AI Core - inference client for the legislative analysis pipeline
//!
//! Talks to an Ollama-compatible server and requests JSON-mode answers,
//! which the application layer parses into structured analyses.

pub mod config;
pub mod error;
pub mod ollama;
pub mod ports;

pub use config::InferenceConfig;
pub use error::InferenceError;
pub use ollama::OllamaInferenceEngine;
pub use ports::{
    ChatRole, InferenceEngine, InferenceMessage, InferenceRequest, InferenceResponse, TokenUsage,
};
