//! Analysis orchestrator - turns a diff into a structured explanation
//!
//! The summarizer is the only network-bound step here and is treated as
//! unreliable: malformed answers, timeouts and outages are retried with
//! backoff and, once the budget is spent, the diff is returned on its own.
//! Only a failed diff or a cancelled request reaches the caller as an error.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use domain::{AnalysisContext, AnalysisKind, AnalysisOutcome, AnalysisPayload, DiffResult, StageId};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::{
    error::ApplicationError,
    ports::SummarizerPort,
    retry::{RetryConfig, RetryResult, with_retry},
    services::{
        DiffService,
        analysis_prompt::{build_prompt, parse_payload, system_prompt},
    },
};

/// Timeouts and retry budget for one analysis
#[derive(Debug, Clone)]
pub struct AnalysisPolicy {
    pub retry: RetryConfig,
    /// Limit for a single summarizer call
    pub attempt_timeout: Duration,
    /// Limit for all attempts and backoff sleeps together
    pub total_timeout: Duration,
    /// Longest diff excerpt sent to the summarizer
    pub max_prompt_diff_chars: usize,
}

impl Default for AnalysisPolicy {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            attempt_timeout: Duration::from_secs(30),
            total_timeout: Duration::from_secs(90),
            max_prompt_diff_chars: 12_000,
        }
    }
}

/// Runs the summarizer over a diff with retry and degrade semantics
pub struct AnalysisOrchestrator {
    summarizer: Arc<dyn SummarizerPort>,
    policy: AnalysisPolicy,
}

impl fmt::Debug for AnalysisOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisOrchestrator")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl AnalysisOrchestrator {
    pub fn new(summarizer: Arc<dyn SummarizerPort>, policy: AnalysisPolicy) -> Self {
        Self { summarizer, policy }
    }

    pub const fn policy(&self) -> &AnalysisPolicy {
        &self.policy
    }

    /// Analyze an already computed diff
    ///
    /// Never fails because of the summarizer; the only error is
    /// [`ApplicationError::Cancelled`] when `cancel` fires first.
    #[instrument(
        skip(self, diff, context, cancel),
        fields(kind = ?kind, additions = diff.additions, deletions = diff.deletions)
    )]
    pub async fn analyze(
        &self,
        diff: DiffResult,
        context: &AnalysisContext,
        kind: AnalysisKind,
        cancel: &CancellationToken,
    ) -> Result<AnalysisOutcome, ApplicationError> {
        if diff.is_unchanged() {
            debug!("Versions are identical, skipping summarizer");
            return Ok(AnalysisOutcome::Degraded {
                diff,
                reason: "no changes between versions".to_string(),
                attempts: 0,
            });
        }

        let system = system_prompt(kind);
        let prompt = build_prompt(&diff, context, kind, self.policy.max_prompt_diff_chars);
        let attempts = AtomicU32::new(0);

        let run = with_retry(&self.policy.retry, || self.attempt(system, &prompt, kind, &attempts));

        let finished = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                info!(attempts = attempts.load(Ordering::Relaxed), "Analysis cancelled by caller");
                return Err(ApplicationError::Cancelled);
            },
            finished = tokio::time::timeout(self.policy.total_timeout, run) => finished,
        };

        let attempts = attempts.load(Ordering::Relaxed);
        let outcome = match finished {
            Ok(RetryResult {
                result: Ok(analysis),
                ..
            }) => {
                info!(attempts, "Analysis succeeded");
                AnalysisOutcome::Succeeded {
                    diff,
                    analysis,
                    attempts,
                }
            },
            Ok(RetryResult { result: Err(e), .. }) => {
                warn!(attempts, error = %e, "Analysis unavailable, returning diff only");
                AnalysisOutcome::Degraded {
                    diff,
                    reason: e.to_string(),
                    attempts,
                }
            },
            Err(_) => {
                warn!(
                    attempts,
                    budget_ms = millis(self.policy.total_timeout),
                    "Analysis budget exhausted, returning diff only"
                );
                AnalysisOutcome::Degraded {
                    diff,
                    reason: "analysis time budget exhausted".to_string(),
                    attempts,
                }
            },
        };
        Ok(outcome)
    }

    /// Compute the diff of two stages and analyze it
    ///
    /// A diff failure is fatal and returned as is; analysis failures degrade.
    pub async fn compare_and_analyze(
        &self,
        diffs: &DiffService,
        source: StageId,
        target: StageId,
        context: &AnalysisContext,
        kind: AnalysisKind,
        cancel: &CancellationToken,
    ) -> Result<AnalysisOutcome, ApplicationError> {
        let diff = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(ApplicationError::Cancelled),
            diff = diffs.compare(source, target) => diff?,
        };
        self.analyze(diff, context, kind, cancel).await
    }

    pub async fn is_healthy(&self) -> bool {
        self.summarizer.is_healthy().await
    }

    pub fn current_model(&self) -> String {
        self.summarizer.current_model()
    }

    async fn attempt(
        &self,
        system: &str,
        prompt: &str,
        kind: AnalysisKind,
        attempts: &AtomicU32,
    ) -> Result<AnalysisPayload, ApplicationError> {
        let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;

        let response = tokio::time::timeout(
            self.policy.attempt_timeout,
            self.summarizer.summarize(system, prompt),
        )
        .await
        .map_err(|_| ApplicationError::AnalysisTimeout {
            timeout_ms: millis(self.policy.attempt_timeout),
        })??;

        debug!(
            attempt,
            model = %response.model,
            tokens = ?response.tokens_used,
            latency_ms = response.latency_ms,
            "Summarizer answered"
        );
        parse_payload(&response.content, kind)
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
