//! Infrastructure layer - adapters for external systems
//!
//! Implements the application ports on top of SQLite, the tracing pipeline
//! and an Ollama-compatible summarization server. Also owns configuration
//! loading and telemetry setup.

pub mod adapters;
pub mod config;
pub mod persistence;
pub mod telemetry;

pub use adapters::{OllamaSummarizerAdapter, TracingAuditSink};
pub use config::{
    AnalysisAppConfig, AppConfig, AuditSinkKind, DatabaseConfig, DiffAppConfig, Environment,
    ModerationAppConfig, ServerConfig,
};
pub use persistence::{
    AsyncDatabase, AsyncDatabaseConfig, AsyncDatabaseError, SqliteAuditSink, SqliteTextVersionStore,
};
pub use telemetry::{LogFormat, TelemetryConfig, TelemetryError, TelemetryGuard, init_telemetry};

/// Open the configured database and apply migrations if enabled
pub async fn connect_database(config: &DatabaseConfig) -> Result<AsyncDatabase, AsyncDatabaseError> {
    let db = AsyncDatabase::new(&config.to_pool_config()).await?;
    if config.run_migrations {
        db.migrate().await?;
    }
    Ok(db)
}
