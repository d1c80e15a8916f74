//! Summarizer adapter and analysis pipeline against a mocked Ollama server

use std::sync::Arc;

use ai_core::InferenceConfig;
use application::{
    AnalysisOrchestrator, AnalysisPolicy, RetryConfig,
    error::ApplicationError,
    ports::SummarizerPort,
};
use chrono::Utc;
use domain::{AnalysisContext, AnalysisKind, AnalysisPayload, DiffResult, StageId, VersionRef};
use infrastructure::OllamaSummarizerAdapter;
use tokio_util::sync::CancellationToken;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, method, path},
};

fn adapter(server: &MockServer) -> OllamaSummarizerAdapter {
    let config = InferenceConfig {
        timeout_ms: 2_000,
        ..InferenceConfig::for_server(server.uri()).with_model("test-model")
    };
    OllamaSummarizerAdapter::new(config).expect("adapter")
}

fn chat_response(content: &str) -> serde_json::Value {
    serde_json::json!({
        "model": "test-model",
        "message": { "role": "assistant", "content": content },
        "done": true,
        "prompt_eval_count": 300,
        "eval_count": 80
    })
}

fn sample_diff() -> DiffResult {
    let reference = |order| VersionRef {
        stage_id: StageId::new(),
        order,
        created_at: Utc::now(),
    };
    DiffResult {
        source_version: reference(1),
        target_version: reference(2),
        unified_diff: "@@ -1,1 +1,1 @@\n-Art. 1. Kara wynosi 100 zł.\n+Art. 1. Kara wynosi 500 zł.".to_string(),
        additions: 1,
        deletions: 1,
    }
}

fn fast_policy() -> AnalysisPolicy {
    AnalysisPolicy {
        retry: RetryConfig::immediate(2),
        ..AnalysisPolicy::default()
    }
}

#[tokio::test]
async fn summarize_requests_json_mode() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(serde_json::json!({ "format": "json", "stream": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response("{}")))
        .expect(1)
        .mount(&server)
        .await;

    let response = adapter(&server)
        .summarize("system", "prompt")
        .await
        .expect("summarize");
    assert_eq!(response.model, "test-model");
    assert_eq!(response.tokens_used, Some(380));
}

#[tokio::test]
async fn summarize_server_error_is_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = adapter(&server).summarize("s", "p").await.unwrap_err();
    assert!(matches!(err, ApplicationError::ExternalService(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn health_follows_tags_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "models": [] })))
        .mount(&server)
        .await;

    assert!(adapter(&server).is_healthy().await);
}

#[tokio::test]
async fn pipeline_returns_structured_explanation() {
    let server = MockServer::start().await;
    let answer = serde_json::json!({
        "explanation": "Podniesiono wysokość kary.",
        "keyChanges": ["Kara wzrosła ze 100 zł do 500 zł"],
        "impact": "Wyższe koszty naruszeń."
    })
    .to_string();
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(&answer)))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = AnalysisOrchestrator::new(Arc::new(adapter(&server)), fast_policy());
    let context = AnalysisContext::new("Ustawa o ochronie zwierząt", "Konsultacje");
    let outcome = orchestrator
        .analyze(sample_diff(), &context, AnalysisKind::DiffExplanation, &CancellationToken::new())
        .await
        .expect("analysis");

    assert!(outcome.analysis_available());
    assert_eq!(outcome.attempts(), 1);
    match outcome.analysis() {
        Some(AnalysisPayload::DiffExplanation(result)) => {
            assert_eq!(result.key_changes.len(), 1);
            assert_eq!(result.impact, "Wyższe koszty naruszeń.");
        },
        other => panic!("unexpected payload: {other:?}"),
    }
}

#[tokio::test]
async fn pipeline_degrades_after_three_malformed_answers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response("to nie jest JSON")))
        .expect(3)
        .mount(&server)
        .await;

    let orchestrator = AnalysisOrchestrator::new(Arc::new(adapter(&server)), fast_policy());
    let diff = sample_diff();
    let outcome = orchestrator
        .analyze(
            diff.clone(),
            &AnalysisContext::new("Ustawa", "Etap"),
            AnalysisKind::Summary,
            &CancellationToken::new(),
        )
        .await
        .expect("degraded outcome");

    assert!(!outcome.analysis_available());
    assert_eq!(outcome.attempts(), 3);
    assert_eq!(outcome.diff(), &diff);
}

#[tokio::test]
async fn pipeline_degrades_when_backend_is_down() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let orchestrator = AnalysisOrchestrator::new(Arc::new(adapter(&server)), fast_policy());
    let outcome = orchestrator
        .analyze(
            sample_diff(),
            &AnalysisContext::new("Ustawa", "Etap"),
            AnalysisKind::DiffExplanation,
            &CancellationToken::new(),
        )
        .await
        .expect("degraded outcome");

    assert!(!outcome.analysis_available());
}
