//! Application state shared across handlers

use std::sync::Arc;

use application::{AnalysisOrchestrator, DiffService, ModerationGate};
use infrastructure::AsyncDatabase;

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub moderation: Arc<ModerationGate>,
    pub diffs: Arc<DiffService>,
    pub analysis: Arc<AnalysisOrchestrator>,
    /// Probed by `/ready` when present
    pub database: Option<AsyncDatabase>,
    /// Honour `X-Forwarded-For` when resolving the audit IP
    pub trust_forwarded_for: bool,
}

impl AppState {
    pub fn new(
        moderation: Arc<ModerationGate>,
        diffs: Arc<DiffService>,
        analysis: Arc<AnalysisOrchestrator>,
    ) -> Self {
        Self {
            moderation,
            diffs,
            analysis,
            database: None,
            trust_forwarded_for: false,
        }
    }

    #[must_use]
    pub fn with_database(mut self, database: AsyncDatabase) -> Self {
        self.database = Some(database);
        self
    }

    #[must_use]
    pub fn with_trust_forwarded_for(mut self, trust: bool) -> Self {
        self.trust_forwarded_for = trust;
        self
    }
}
