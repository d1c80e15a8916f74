//! Port for the moderation audit trail
//!
//! Append-only. Implementations must accept concurrent appends from many
//! moderation calls without caller-side locking; duplicate appends are
//! acceptable.

use async_trait::async_trait;
use domain::{AUDIT_CONTENT_LIMIT, AuditEvent};
#[cfg(test)]
use mockall::automock;
use tokio::sync::Mutex;

use crate::error::ApplicationError;

/// Port for audit event storage
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AuditSinkPort: Send + Sync {
    /// Append one event
    async fn append(&self, event: &AuditEvent) -> Result<(), ApplicationError>;
}

/// Process-local sink that keeps events in memory
///
/// Backs the CLI dry runs and tests; not durable.
#[derive(Debug, Default)]
pub struct InMemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all appended events in append order
    pub async fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.events.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.lock().await.is_empty()
    }
}

#[async_trait]
impl AuditSinkPort for InMemoryAuditSink {
    async fn append(&self, event: &AuditEvent) -> Result<(), ApplicationError> {
        debug_assert!(event.truncated_content().chars().count() <= AUDIT_CONTENT_LIMIT);
        self.events.lock().await.push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use domain::{AuditEventType, RejectionCode};

    use super::*;

    #[tokio::test]
    async fn append_and_read_back() {
        let sink = InMemoryAuditSink::new();
        sink.append(&AuditEvent::warning("tekst")).await.unwrap();
        sink.append(&AuditEvent::blocked(RejectionCode::PersonalDataInContent, "x"))
            .await
            .unwrap();

        let events = sink.events().await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type(), AuditEventType::Warning);
        assert_eq!(events[1].event_type(), AuditEventType::Blocked);
    }

    #[tokio::test]
    async fn duplicate_appends_are_kept() {
        let sink = InMemoryAuditSink::new();
        let event = AuditEvent::warning("powtórka");
        sink.append(&event).await.unwrap();
        sink.append(&event).await.unwrap();
        assert_eq!(sink.len().await, 2);
    }

    #[tokio::test]
    async fn concurrent_appends_are_all_recorded() {
        let sink = Arc::new(InMemoryAuditSink::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let sink = Arc::clone(&sink);
            handles.push(tokio::spawn(async move {
                sink.append(&AuditEvent::warning(&format!("event {i}")))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(sink.len().await, 32);
    }
}
