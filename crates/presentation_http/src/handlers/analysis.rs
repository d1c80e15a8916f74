//! Diff analysis handler

use axum::{Json, extract::State};
use domain::{AnalysisContext, AnalysisKind, AnalysisOutcome, AnalysisPayload, DiffResult, StageId};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};
use validator::Validate;

use crate::{error::ApiError, middleware::ValidatedJson, state::AppState};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub source_stage_id: StageId,
    pub target_stage_id: StageId,
    #[validate(length(min = 1, max = 500, message = "must be 1-500 characters"))]
    pub law_title: String,
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub phase_name: String,
    #[validate(length(max = 200, message = "must be at most 200 characters"))]
    pub stage_label: Option<String>,
    #[serde(default)]
    pub kind: AnalysisKind,
}

impl AnalysisRequest {
    fn context(&self) -> AnalysisContext {
        let context = AnalysisContext::new(&self.law_title, &self.phase_name);
        match &self.stage_label {
            Some(label) => context.with_stage_label(label),
            None => context,
        }
    }
}

/// Diff plus the analysis when one could be produced
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub diff: DiffResult,
    pub analysis_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisPayload>,
    pub attempts: u32,
}

impl From<AnalysisOutcome> for AnalysisResponse {
    fn from(outcome: AnalysisOutcome) -> Self {
        match outcome {
            AnalysisOutcome::Succeeded {
                diff,
                analysis,
                attempts,
            } => Self {
                diff,
                analysis_available: true,
                analysis: Some(analysis),
                attempts,
            },
            AnalysisOutcome::Degraded { diff, attempts, .. } => Self {
                diff,
                analysis_available: false,
                analysis: None,
                attempts,
            },
        }
    }
}

/// Compare two stages and explain the change
///
/// The pipeline runs on its own task. If the client disconnects, the handler
/// future is dropped and the guard cancels the pipeline.
#[instrument(skip_all, fields(kind = ?request.kind))]
pub async fn analyze(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<AnalysisRequest>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let context = request.context();
    let (source, target, kind) = (request.source_stage_id, request.target_stage_id, request.kind);
    let task = tokio::spawn(async move {
        state
            .analysis
            .compare_and_analyze(&state.diffs, source, target, &context, kind, &cancel)
            .await
    });

    let outcome = task
        .await
        .map_err(|e| ApiError::Internal(format!("analysis task failed: {e}")))??;

    if let AnalysisOutcome::Degraded { reason, .. } = &outcome {
        info!(reason = %reason, "Returning diff without analysis");
    }
    Ok(Json(outcome.into()))
}
