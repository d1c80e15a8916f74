//! Moderation check handler

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use crate::{
    error::ApiError,
    middleware::{ClientIp, ValidatedJson},
    state::AppState,
};

/// Public comment submitted for a legislative stage
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckRequest {
    #[validate(length(min = 1, max = 10_000, message = "must be 1-10000 characters"))]
    pub content: String,
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub nickname: String,
}

/// Accepted submission
///
/// `warnings` are advisory self-disclosure hints for the author.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    pub allowed: bool,
    pub warnings: Vec<String>,
    pub filtered_content: String,
}

/// Run the moderation gate over a submission
///
/// Rejections answer `422` with the rejection code and a user-facing message.
#[instrument(
    skip_all,
    fields(nickname_len = request.nickname.len(), content_len = request.content.len())
)]
pub async fn check(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    ValidatedJson(request): ValidatedJson<CheckRequest>,
) -> Result<Json<CheckResponse>, ApiError> {
    let verdict = state
        .moderation
        .check(&request.nickname, &request.content, ip)
        .await?;

    Ok(Json(CheckResponse {
        allowed: true,
        filtered_content: verdict.filtered_content().to_string(),
        warnings: verdict.into_warnings(),
    }))
}
