//! Ollama-compatible inference engine
//!
//! Works against a stock Ollama server or any proxy that exposes
//! `/api/chat` and `/api/tags`.

mod client;

pub use client::OllamaInferenceEngine;
