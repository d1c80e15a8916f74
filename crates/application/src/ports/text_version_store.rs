//! Port for reading recorded stage texts

use async_trait::async_trait;
use domain::{StageId, TextVersion};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Access to stage text versions owned by the persistence collaborator
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TextVersionStore: Send + Sync {
    /// Fetch the text version recorded for a stage
    async fn get(&self, stage_id: StageId) -> Result<Option<TextVersion>, ApplicationError>;

    /// Version of the stage directly preceding `version` within its phase
    async fn previous_in_phase(
        &self,
        version: &TextVersion,
    ) -> Result<Option<TextVersion>, ApplicationError>;

    /// Record a new text version; versions are never updated in place
    async fn save(&self, version: &TextVersion) -> Result<(), ApplicationError>;
}
