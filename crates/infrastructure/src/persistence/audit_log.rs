//! SQLite moderation audit sink
//!
//! Implements `AuditSinkPort` on top of the `moderation_audit` table and adds
//! the read and retention queries used by operators.

use std::net::IpAddr;

use application::{error::ApplicationError, ports::AuditSinkPort};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{AUDIT_CONTENT_LIMIT, AuditEvent, AuditEventType, RejectionCode, truncate_chars};
use sqlx::SqlitePool;
use tracing::{debug, instrument, warn};

use super::{encode_timestamp, error::map_sqlx_error};

/// SQLite-backed audit sink
#[derive(Debug, Clone)]
pub struct SqliteAuditSink {
    pool: SqlitePool,
}

impl SqliteAuditSink {
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Most recent events first
    #[instrument(skip(self))]
    pub async fn recent(&self, limit: u32) -> Result<Vec<AuditEvent>, ApplicationError> {
        let rows: Vec<AuditRow> = sqlx::query_as(
            "SELECT id, timestamp, event_type, truncated_content, warnings, ip_address, code
             FROM moderation_audit
             ORDER BY timestamp DESC, id DESC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().filter_map(AuditRow::into_event).collect())
    }

    /// Number of stored events of the given type
    pub async fn count(&self, event_type: AuditEventType) -> Result<u64, ApplicationError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM moderation_audit WHERE event_type = $1")
                .bind(event_type.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// Delete events recorded before `cutoff`, returning how many were removed
    #[instrument(skip(self), fields(cutoff = %cutoff))]
    pub async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, ApplicationError> {
        let result = sqlx::query("DELETE FROM moderation_audit WHERE timestamp < $1")
            .bind(encode_timestamp(cutoff))
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        debug!(removed = result.rows_affected(), "Purged audit events");
        Ok(result.rows_affected())
    }
}

#[derive(sqlx::FromRow)]
struct AuditRow {
    id: i64,
    timestamp: String,
    event_type: String,
    truncated_content: String,
    warnings: String,
    ip_address: Option<String>,
    code: Option<String>,
}

impl AuditRow {
    fn into_event(self) -> Option<AuditEvent> {
        let Some(event_type) = AuditEventType::parse(&self.event_type) else {
            warn!(id = self.id, event_type = %self.event_type, "Skipping audit row with unknown type");
            return None;
        };
        let timestamp = DateTime::parse_from_rfc3339(&self.timestamp)
            .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));
        let warnings: Vec<String> = serde_json::from_str(&self.warnings).unwrap_or_default();
        let ip = self.ip_address.and_then(|s| s.parse::<IpAddr>().ok());

        let mut event = AuditEvent::new(event_type, &self.truncated_content)
            .with_warnings(warnings)
            .with_ip(ip)
            .with_id(self.id)
            .with_timestamp(timestamp);
        if let Some(code) = self.code.as_deref().and_then(RejectionCode::parse) {
            event = event.with_code(code);
        }
        Some(event)
    }
}

#[async_trait]
impl AuditSinkPort for SqliteAuditSink {
    #[instrument(skip(self, event), fields(event_type = %event.event_type()))]
    async fn append(&self, event: &AuditEvent) -> Result<(), ApplicationError> {
        let warnings = serde_json::to_string(event.warnings())
            .map_err(|e| ApplicationError::Internal(format!("Failed to encode warnings: {e}")))?;

        sqlx::query(
            "INSERT INTO moderation_audit \
             (timestamp, event_type, truncated_content, warnings, ip_address, code)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(encode_timestamp(event.timestamp()))
        .bind(event.event_type().as_str())
        .bind(truncate_chars(event.truncated_content(), AUDIT_CONTENT_LIMIT))
        .bind(warnings)
        .bind(event.ip().map(|ip| ip.to_string()))
        .bind(event.code().map(RejectionCode::as_str))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        debug!("Recorded moderation audit event");
        Ok(())
    }
}
