//! Diff service - resolves stage texts and runs the engine off the runtime

use std::{fmt, sync::Arc, time::Duration};

use domain::{DiffResult, StageId, TextVersion};
use tracing::{debug, error, instrument, warn};

use crate::{
    error::ApplicationError,
    ports::TextVersionStore,
    services::text_diff::{Deadline, TextDiffEngine},
};

/// Compares recorded stage texts
///
/// The LCS table is quadratic in the number of differing lines, so the
/// engine runs on the blocking pool and is bounded by `timeout`.
pub struct DiffService {
    store: Arc<dyn TextVersionStore>,
    engine: TextDiffEngine,
    timeout: Duration,
}

impl fmt::Debug for DiffService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiffService")
            .field("engine", &self.engine)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl DiffService {
    pub fn new(store: Arc<dyn TextVersionStore>, engine: TextDiffEngine, timeout: Duration) -> Self {
        Self {
            store,
            engine,
            timeout,
        }
    }

    /// Diff the texts recorded at two stages
    #[instrument(skip(self), fields(source = %source, target = %target))]
    pub async fn compare(
        &self,
        source: StageId,
        target: StageId,
    ) -> Result<DiffResult, ApplicationError> {
        let source_version = self.load(source).await?;
        let target_version = self.load(target).await?;
        self.compare_versions(source_version, target_version).await
    }

    /// Diff a stage against the stage preceding it in the same phase
    #[instrument(skip(self), fields(stage = %stage))]
    pub async fn compare_with_previous(&self, stage: StageId) -> Result<DiffResult, ApplicationError> {
        let current = self.load(stage).await?;
        let previous = self
            .store
            .previous_in_phase(&current)
            .await
            .map_err(|e| unreadable(stage, &e))?
            .ok_or_else(|| {
                ApplicationError::DiffComputation(format!(
                    "stage {stage} has no preceding stage in its phase"
                ))
            })?;
        self.compare_versions(previous, current).await
    }

    /// Diff two already loaded versions
    pub async fn compare_versions(
        &self,
        source: TextVersion,
        target: TextVersion,
    ) -> Result<DiffResult, ApplicationError> {
        let engine = self.engine;
        let deadline = Deadline::after(self.timeout);
        let worker = tokio::task::spawn_blocking(move || {
            engine.diff_versions(&source, &target, Some(&deadline))
        });

        let result = match tokio::time::timeout(self.timeout, worker).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(ApplicationError::Internal(format!(
                "diff worker failed: {join_error}"
            ))),
            Err(_) => Err(ApplicationError::DiffTimeout {
                budget_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        };

        match &result {
            Ok(diff) => debug!(
                additions = diff.additions,
                deletions = diff.deletions,
                "Diff computed"
            ),
            Err(e @ ApplicationError::DiffTimeout { .. }) => warn!(error = %e, "Diff budget exceeded"),
            Err(e) => warn!(error = %e, "Diff failed"),
        }
        result
    }

    async fn load(&self, stage: StageId) -> Result<TextVersion, ApplicationError> {
        self.store
            .get(stage)
            .await
            .map_err(|e| unreadable(stage, &e))?
            .ok_or_else(|| ApplicationError::DiffComputation(format!("no text recorded for stage {stage}")))
    }
}

fn unreadable(stage: StageId, cause: &ApplicationError) -> ApplicationError {
    error!(stage = %stage, error = %cause, "Failed to read stage text");
    ApplicationError::DiffComputation(format!("text of stage {stage} is unreadable"))
}
