//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod ollama_summarizer_adapter;
mod tracing_audit_sink;

pub use ollama_summarizer_adapter::OllamaSummarizerAdapter;
pub use tracing_audit_sink::TracingAuditSink;
