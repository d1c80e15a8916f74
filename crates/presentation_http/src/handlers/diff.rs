//! Stage diff handlers

use axum::{
    Json,
    extract::{Path, State},
};
use domain::{DiffResult, StageId};
use serde::Deserialize;
use validator::Validate;

use crate::{error::ApiError, middleware::ValidatedJson, state::AppState};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DiffRequest {
    pub source_stage_id: StageId,
    pub target_stage_id: StageId,
}

/// Diff the texts of two stages
pub async fn compare(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<DiffRequest>,
) -> Result<Json<DiffResult>, ApiError> {
    let diff = state
        .diffs
        .compare(request.source_stage_id, request.target_stage_id)
        .await?;
    Ok(Json(diff))
}

/// Diff a stage against its predecessor in the same phase
pub async fn compare_with_previous(
    State(state): State<AppState>,
    Path(stage_id): Path<String>,
) -> Result<Json<DiffResult>, ApiError> {
    let stage = StageId::parse(&stage_id)?;
    let diff = state.diffs.compare_with_previous(stage).await?;
    Ok(Json(diff))
}
