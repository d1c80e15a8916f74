//! Audit sink that writes moderation events to the tracing pipeline
//!
//! Used when no database is configured. Events go to the `lextrack::audit`
//! target so they can be routed separately by the subscriber.

use application::{error::ApplicationError, ports::AuditSinkPort};
use async_trait::async_trait;
use domain::{AuditEvent, AuditEventType};
use tracing::{info, warn};

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl TracingAuditSink {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditSinkPort for TracingAuditSink {
    async fn append(&self, event: &AuditEvent) -> Result<(), ApplicationError> {
        let ip = event.ip().map(|ip| ip.to_string());
        let code = event.code().map(|c| c.as_str());
        match event.event_type() {
            AuditEventType::Blocked => warn!(
                target: "lextrack::audit",
                event = %event.event_type(),
                code = ?code,
                ip = ?ip,
                warnings = event.warnings().len(),
                content = %event.truncated_content(),
                "Moderation blocked submission"
            ),
            AuditEventType::Warning | AuditEventType::Clean => info!(
                target: "lextrack::audit",
                event = %event.event_type(),
                ip = ?ip,
                warnings = event.warnings().len(),
                content = %event.truncated_content(),
                "Moderation event"
            ),
        }
        Ok(())
    }
}
