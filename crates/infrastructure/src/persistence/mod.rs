//! Persistence module
//!
//! SQLite storage for the moderation audit trail and stage text versions.

mod async_connection;
mod audit_log;
mod error;
mod version_store;

pub use async_connection::{AsyncDatabase, AsyncDatabaseConfig, AsyncDatabaseError};
pub use audit_log::SqliteAuditSink;
pub use error::map_sqlx_error;
pub use version_store::SqliteTextVersionStore;

use chrono::{DateTime, SecondsFormat, Utc};

/// Fixed-width UTC timestamps so lexical order matches chronological order
pub(crate) fn encode_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}
