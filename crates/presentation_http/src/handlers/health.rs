//! Health check handlers

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Liveness check
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness response
///
/// The summarizer being down does not make the service unready: the diff
/// pipeline still answers, analysis just degrades.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub summarizer: ServiceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<ServiceStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Readiness check
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let summarizer_healthy = state.analysis.is_healthy().await;
    let summarizer = ServiceStatus {
        healthy: summarizer_healthy,
        model: summarizer_healthy.then(|| state.analysis.current_model()),
    };

    let database = match &state.database {
        Some(db) => Some(ServiceStatus {
            healthy: db.ping().await,
            model: None,
        }),
        None => None,
    };

    let ready = database.as_ref().is_none_or(|db| db.healthy);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadinessResponse {
            ready,
            summarizer,
            database,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn liveness_reports_crate_version() {
        let Json(resp) = health_check().await;
        assert_eq!(resp.status, "ok");
        assert_eq!(resp.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn readiness_omits_absent_database() {
        let resp = ReadinessResponse {
            ready: true,
            summarizer: ServiceStatus {
                healthy: false,
                model: None,
            },
            database: None,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json.get("database").is_none());
        assert!(json["summarizer"].get("model").is_none());
    }
}
