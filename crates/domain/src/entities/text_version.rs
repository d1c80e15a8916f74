//! Recorded law text of a single stage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{PhaseId, StageId};

/// One stage's recorded legal text
///
/// The content is immutable once created; only the persistence layer
/// constructs these from stored rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextVersion {
    stage_id: StageId,
    phase_id: PhaseId,
    order: i32,
    content: String,
    created_at: DateTime<Utc>,
}

impl TextVersion {
    pub fn new(stage_id: StageId, phase_id: PhaseId, order: i32, content: impl Into<String>) -> Self {
        Self {
            stage_id,
            phase_id,
            order,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// Override the creation timestamp (used when loading stored rows)
    #[must_use]
    pub const fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub const fn stage_id(&self) -> StageId {
        self.stage_id
    }

    pub const fn phase_id(&self) -> PhaseId {
        self.phase_id
    }

    pub const fn order(&self) -> i32 {
        self.order
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Lightweight reference without the text body
    pub const fn reference(&self) -> VersionRef {
        VersionRef {
            stage_id: self.stage_id,
            order: self.order,
            created_at: self.created_at,
        }
    }
}

/// Reference to a text version carried inside a diff result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRef {
    pub stage_id: StageId,
    pub order: i32,
    pub created_at: DateTime<Utc>,
}
