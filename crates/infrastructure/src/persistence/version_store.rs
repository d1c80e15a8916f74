//! SQLite store for stage text versions

use application::{error::ApplicationError, ports::TextVersionStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{PhaseId, StageId, TextVersion};
use sqlx::SqlitePool;
use tracing::{instrument, warn};

use super::{encode_timestamp, error::map_sqlx_error};

#[derive(Debug, Clone)]
pub struct SqliteTextVersionStore {
    pool: SqlitePool,
}

impl SqliteTextVersionStore {
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct VersionRow {
    stage_id: String,
    phase_id: String,
    stage_order: i32,
    content: String,
    created_at: String,
}

impl VersionRow {
    fn into_version(self) -> Result<TextVersion, ApplicationError> {
        let stage_id = StageId::parse(&self.stage_id)?;
        let phase_id = PhaseId::parse(&self.phase_id)?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at).map_or_else(
            |e| {
                warn!(stage = %self.stage_id, error = %e, "Unparseable created_at, using now");
                Utc::now()
            },
            |dt| dt.with_timezone(&Utc),
        );
        Ok(TextVersion::new(stage_id, phase_id, self.stage_order, self.content).with_created_at(created_at))
    }
}

#[async_trait]
impl TextVersionStore for SqliteTextVersionStore {
    #[instrument(skip(self), fields(stage = %stage_id))]
    async fn get(&self, stage_id: StageId) -> Result<Option<TextVersion>, ApplicationError> {
        let row: Option<VersionRow> = sqlx::query_as(
            "SELECT stage_id, phase_id, stage_order, content, created_at
             FROM stage_versions WHERE stage_id = $1",
        )
        .bind(stage_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(VersionRow::into_version).transpose()
    }

    #[instrument(skip(self, version), fields(stage = %version.stage_id(), order = version.order()))]
    async fn previous_in_phase(
        &self,
        version: &TextVersion,
    ) -> Result<Option<TextVersion>, ApplicationError> {
        let row: Option<VersionRow> = sqlx::query_as(
            "SELECT stage_id, phase_id, stage_order, content, created_at
             FROM stage_versions
             WHERE phase_id = $1 AND stage_order < $2
             ORDER BY stage_order DESC
             LIMIT 1",
        )
        .bind(version.phase_id().to_string())
        .bind(version.order())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(VersionRow::into_version).transpose()
    }

    /// Record a new stage text. Stored text is never replaced: a second save
    /// for the same stage, or a second stage at the same order in a phase,
    /// fails with `Validation`.
    #[instrument(skip(self, version), fields(stage = %version.stage_id(), len = version.content().len()))]
    async fn save(&self, version: &TextVersion) -> Result<(), ApplicationError> {
        sqlx::query(
            "INSERT INTO stage_versions (stage_id, phase_id, stage_order, content, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(version.stage_id().to_string())
        .bind(version.phase_id().to_string())
        .bind(version.order())
        .bind(version.content())
        .bind(encode_timestamp(version.created_at()))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }
}
