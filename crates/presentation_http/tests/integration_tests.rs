//! Integration tests for HTTP handlers
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use application::{
    AnalysisOrchestrator, AnalysisPolicy, DiffService, InMemoryAuditSink, KeywordScanner,
    ModerationGate, PatternScanner, RetryConfig, TextDiffEngine,
    error::ApplicationError,
    ports::{SummarizerPort, SummaryResponse, TextVersionStore},
};
use async_trait::async_trait;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use domain::{AuditEventType, PhaseId, StageId, TextVersion};
use presentation_http::{AppState, create_router};
use serde_json::json;
use tokio::sync::RwLock;

/// Stage texts kept in a map
#[derive(Default)]
struct MemoryVersionStore {
    versions: RwLock<HashMap<StageId, TextVersion>>,
}

#[async_trait]
impl TextVersionStore for MemoryVersionStore {
    async fn get(&self, stage_id: StageId) -> Result<Option<TextVersion>, ApplicationError> {
        Ok(self.versions.read().await.get(&stage_id).cloned())
    }

    async fn previous_in_phase(
        &self,
        version: &TextVersion,
    ) -> Result<Option<TextVersion>, ApplicationError> {
        Ok(self
            .versions
            .read()
            .await
            .values()
            .filter(|v| v.phase_id() == version.phase_id() && v.order() < version.order())
            .max_by_key(|v| v.order())
            .cloned())
    }

    async fn save(&self, version: &TextVersion) -> Result<(), ApplicationError> {
        let mut versions = self.versions.write().await;
        let taken = versions.contains_key(&version.stage_id())
            || versions
                .values()
                .any(|v| v.phase_id() == version.phase_id() && v.order() == version.order());
        if taken {
            return Err(ApplicationError::Validation("duplicate stage version".into()));
        }
        versions.insert(version.stage_id(), version.clone());
        Ok(())
    }
}

/// Summarizer answering with a fixed body
struct FixedSummarizer {
    answer: Option<String>,
    calls: AtomicU32,
}

impl FixedSummarizer {
    fn answering(answer: &str) -> Self {
        Self {
            answer: Some(answer.to_string()),
            calls: AtomicU32::new(0),
        }
    }

    fn down() -> Self {
        Self {
            answer: None,
            calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl SummarizerPort for FixedSummarizer {
    async fn summarize(
        &self,
        _system_prompt: &str,
        _prompt: &str,
    ) -> Result<SummaryResponse, ApplicationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.answer {
            Some(content) => Ok(SummaryResponse {
                content: content.clone(),
                model: "test-model".to_string(),
                tokens_used: Some(42),
                latency_ms: 5,
            }),
            None => Err(ApplicationError::ExternalService(
                "summarizer unreachable".to_string(),
            )),
        }
    }

    async fn is_healthy(&self) -> bool {
        self.answer.is_some()
    }

    fn current_model(&self) -> String {
        "test-model".to_string()
    }
}

struct Harness {
    server: TestServer,
    audit: Arc<InMemoryAuditSink>,
    summarizer: Arc<FixedSummarizer>,
    first: StageId,
    second: StageId,
}

const FIRST_TEXT: &str = "Art. 1. Ustawa określa zasady.\nArt. 2. Stawka wynosi 5%.\n";
const SECOND_TEXT: &str = "Art. 1. Ustawa określa zasady.\nArt. 2. Stawka wynosi 8%.\n";

async fn harness(summarizer: FixedSummarizer, trust_forwarded_for: bool) -> Harness {
    let phase = PhaseId::new();
    let first = TextVersion::new(StageId::new(), phase, 1, FIRST_TEXT);
    let second = TextVersion::new(StageId::new(), phase, 2, SECOND_TEXT);

    let store = Arc::new(MemoryVersionStore::default());
    store.save(&first).await.unwrap();
    store.save(&second).await.unwrap();

    let audit = Arc::new(InMemoryAuditSink::new());
    let gate = ModerationGate::new(
        Arc::new(PatternScanner::polish().unwrap()),
        Arc::new(KeywordScanner::polish().unwrap()),
        audit.clone(),
    );
    let diffs = DiffService::new(store, TextDiffEngine::default(), Duration::from_secs(5));

    let summarizer = Arc::new(summarizer);
    let policy = AnalysisPolicy {
        retry: RetryConfig::immediate(2),
        attempt_timeout: Duration::from_secs(2),
        total_timeout: Duration::from_secs(5),
        ..AnalysisPolicy::default()
    };
    let analysis = AnalysisOrchestrator::new(summarizer.clone(), policy);

    let state = AppState::new(Arc::new(gate), Arc::new(diffs), Arc::new(analysis))
        .with_trust_forwarded_for(trust_forwarded_for);
    let server = TestServer::new(create_router(state)).expect("Failed to create test server");

    Harness {
        server,
        audit,
        summarizer,
        first: first.stage_id(),
        second: second.stage_id(),
    }
}

fn explanation_json() -> String {
    json!({
        "explanation": "Podniesiono stawkę z 5% do 8%.",
        "keyChanges": ["Art. 2: stawka 8%"],
        "impact": "Wyższe obciążenie podatników."
    })
    .to_string()
}

// ============ Health Endpoint Tests ============

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let h = harness(FixedSummarizer::answering("{}"), false).await;

    let response = h.server.get("/health").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn readiness_reports_summarizer_model() {
    let h = harness(FixedSummarizer::answering("{}"), false).await;

    let response = h.server.get("/ready").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["ready"], true);
    assert_eq!(body["summarizer"]["healthy"], true);
    assert_eq!(body["summarizer"]["model"], "test-model");
}

#[tokio::test]
async fn readiness_stays_ready_without_summarizer() {
    let h = harness(FixedSummarizer::down(), false).await;

    let response = h.server.get("/ready").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["summarizer"]["healthy"], false);
}

// ============ Moderation Endpoint Tests ============

#[tokio::test]
async fn clean_submission_is_allowed_without_audit() {
    let h = harness(FixedSummarizer::answering("{}"), false).await;

    let response = h
        .server
        .post("/v1/moderation/check")
        .json(&json!({"nickname": "obywatel", "content": "Popieram zmianę art. 2."}))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["allowed"], true);
    assert_eq!(body["warnings"], json!([]));
    assert_eq!(body["filteredContent"], "Popieram zmianę art. 2.");
    assert!(h.audit.is_empty().await);
}

#[tokio::test]
async fn keyword_submission_is_allowed_with_warning() {
    let h = harness(FixedSummarizer::answering("{}"), false).await;

    let response = h
        .server
        .post("/v1/moderation/check")
        .json(&json!({"nickname": "obywatel", "content": "ZADZWOŃ DO MNIE wieczorem"}))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["warnings"].as_array().unwrap().len(), 1);

    let events = h.audit.events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type(), AuditEventType::Warning);
}

#[tokio::test]
async fn personal_data_in_content_is_rejected() {
    let h = harness(FixedSummarizer::answering("{}"), false).await;

    let response = h
        .server
        .post("/v1/moderation/check")
        .json(&json!({"nickname": "obywatel", "content": "Mój PESEL to 44051401359"}))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "PERSONAL_DATA_IN_CONTENT");
    assert!(body["message"].is_string());
    assert!(!body["warnings"].as_array().unwrap().is_empty());

    let events = h.audit.events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type(), AuditEventType::Blocked);
    assert!(!events[0].truncated_content().contains("44051401359"));
}

#[tokio::test]
async fn personal_data_in_nickname_is_rejected() {
    let h = harness(FixedSummarizer::answering("{}"), false).await;

    let response = h
        .server
        .post("/v1/moderation/check")
        .json(&json!({"nickname": "jan@example.com", "content": "Mój PESEL to 44051401359"}))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "PERSONAL_DATA_IN_NICKNAME");
}

#[tokio::test]
async fn forwarded_address_is_audited_when_trusted() {
    let h = harness(FixedSummarizer::answering("{}"), true).await;

    h.server
        .post("/v1/moderation/check")
        .add_header(
            HeaderName::from_static("x-forwarded-for"),
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        )
        .json(&json!({"nickname": "obywatel", "content": "tel. 600 700 800"}))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let events = h.audit.events().await;
    assert_eq!(events[0].ip(), Some("203.0.113.9".parse().unwrap()));
}

#[tokio::test]
async fn malformed_moderation_body_is_validation_error() {
    let h = harness(FixedSummarizer::answering("{}"), false).await;

    let response = h
        .server
        .post("/v1/moderation/check")
        .json(&json!({"nickname": "obywatel"}))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "validation_error");
    assert!(h.audit.is_empty().await);
}

// ============ Diff Endpoint Tests ============

#[tokio::test]
async fn diff_between_stages() {
    let h = harness(FixedSummarizer::answering("{}"), false).await;

    let response = h
        .server
        .post("/v1/diff")
        .json(&json!({"sourceStageId": h.first, "targetStageId": h.second}))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["additions"], 1);
    assert_eq!(body["deletions"], 1);
    assert_eq!(body["sourceVersion"]["order"], 1);
    assert_eq!(body["targetVersion"]["order"], 2);
    let unified = body["unifiedDiff"].as_str().unwrap();
    assert!(unified.contains("-Art. 2. Stawka wynosi 5%."));
    assert!(unified.contains("+Art. 2. Stawka wynosi 8%."));
}

#[tokio::test]
async fn diff_with_unknown_stage_is_not_found() {
    let h = harness(FixedSummarizer::answering("{}"), false).await;

    let response = h
        .server
        .post("/v1/diff")
        .json(&json!({"sourceStageId": h.first, "targetStageId": StageId::new()}))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn diff_against_previous_stage() {
    let h = harness(FixedSummarizer::answering("{}"), false).await;

    let response = h
        .server
        .get(&format!("/v1/stages/{}/diff/previous", h.second))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["sourceVersion"]["stageId"], json!(h.first));
    assert_eq!(body["additions"], 1);
}

#[tokio::test]
async fn first_stage_has_no_previous() {
    let h = harness(FixedSummarizer::answering("{}"), false).await;

    let response = h
        .server
        .get(&format!("/v1/stages/{}/diff/previous", h.first))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn malformed_stage_id_is_bad_request() {
    let h = harness(FixedSummarizer::answering("{}"), false).await;

    let response = h.server.get("/v1/stages/not-a-uuid/diff/previous").await;

    response.assert_status_bad_request();
}

// ============ Analysis Endpoint Tests ============

#[tokio::test]
async fn analysis_returns_diff_and_explanation() {
    let h = harness(FixedSummarizer::answering(&explanation_json()), false).await;

    let response = h
        .server
        .post("/v1/analysis")
        .json(&json!({
            "sourceStageId": h.first,
            "targetStageId": h.second,
            "lawTitle": "Ustawa o podatku od towarów",
            "phaseName": "Sejm",
            "kind": "diff_explanation"
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["analysisAvailable"], true);
    assert_eq!(body["attempts"], 1);
    assert_eq!(body["analysis"]["kind"], "diff_explanation");
    assert_eq!(body["analysis"]["keyChanges"][0], "Art. 2: stawka 8%");
    assert_eq!(body["diff"]["additions"], 1);
}

#[tokio::test]
async fn analysis_degrades_when_summarizer_is_down() {
    let h = harness(FixedSummarizer::down(), false).await;

    let response = h
        .server
        .post("/v1/analysis")
        .json(&json!({
            "sourceStageId": h.first,
            "targetStageId": h.second,
            "lawTitle": "Ustawa",
            "phaseName": "Sejm"
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["analysisAvailable"], false);
    assert!(body.get("analysis").is_none());
    assert_eq!(body["diff"]["deletions"], 1);
    assert_eq!(body["attempts"], 3);
    assert_eq!(h.summarizer.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn analysis_degrades_on_malformed_answer() {
    let h = harness(FixedSummarizer::answering("to nie jest JSON"), false).await;

    let response = h
        .server
        .post("/v1/analysis")
        .json(&json!({
            "sourceStageId": h.first,
            "targetStageId": h.second,
            "lawTitle": "Ustawa",
            "phaseName": "Sejm"
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["analysisAvailable"], false);
    assert_eq!(body["attempts"], 3);
}

#[tokio::test]
async fn identical_stages_skip_the_summarizer() {
    let h = harness(FixedSummarizer::answering(&explanation_json()), false).await;

    let response = h
        .server
        .post("/v1/analysis")
        .json(&json!({
            "sourceStageId": h.second,
            "targetStageId": h.second,
            "lawTitle": "Ustawa",
            "phaseName": "Sejm"
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["analysisAvailable"], false);
    assert_eq!(body["attempts"], 0);
    assert_eq!(h.summarizer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn analysis_of_missing_stage_fails() {
    let h = harness(FixedSummarizer::answering(&explanation_json()), false).await;

    let response = h
        .server
        .post("/v1/analysis")
        .json(&json!({
            "sourceStageId": StageId::new(),
            "targetStageId": h.second,
            "lawTitle": "Ustawa",
            "phaseName": "Sejm"
        }))
        .await;

    response.assert_status_not_found();
    assert_eq!(h.summarizer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn analysis_requires_law_title() {
    let h = harness(FixedSummarizer::answering(&explanation_json()), false).await;

    let response = h
        .server
        .post("/v1/analysis")
        .json(&json!({
            "sourceStageId": h.first,
            "targetStageId": h.second,
            "lawTitle": "",
            "phaseName": "Sejm"
        }))
        .await;

    response.assert_status_bad_request();
}
