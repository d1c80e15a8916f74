//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod audit_sink;
mod summarizer_port;
mod text_version_store;

#[cfg(test)]
pub use audit_sink::MockAuditSinkPort;
pub use audit_sink::{AuditSinkPort, InMemoryAuditSink};
#[cfg(test)]
pub use summarizer_port::MockSummarizerPort;
pub use summarizer_port::{SummarizerPort, SummaryResponse};
#[cfg(test)]
pub use text_version_store::MockTextVersionStore;
pub use text_version_store::TextVersionStore;
