//! Moderation audit maintenance

use chrono::{DateTime, Duration, Utc};
use domain::AuditEvent;
use infrastructure::{AsyncDatabase, SqliteAuditSink};
use tracing::info;

/// Events older than this instant are eligible for purging
pub fn retention_cutoff(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now - Duration::days(i64::from(days))
}

/// Delete audit events older than `days`; returns the number removed
pub async fn purge(db: &AsyncDatabase, days: u32) -> anyhow::Result<u64> {
    let cutoff = retention_cutoff(Utc::now(), days);
    let removed = SqliteAuditSink::new(db.pool().clone())
        .purge_older_than(cutoff)
        .await?;
    info!(days, removed, cutoff = %cutoff, "Audit retention applied");
    Ok(removed)
}

/// Newest events first
pub async fn recent(db: &AsyncDatabase, limit: u32) -> anyhow::Result<Vec<AuditEvent>> {
    Ok(SqliteAuditSink::new(db.pool().clone())
        .recent(limit)
        .await?)
}
