//! LexTrack HTTP server
//!
//! Main entry point for the HTTP API server.

use std::{future::IntoFuture, net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use application::{
    AnalysisOrchestrator, AuditSinkPort, DiffService, KeywordScanner, ModerationGate,
    PatternScanner,
};
use axum::http::{HeaderValue, Method};
use infrastructure::{
    AppConfig, AuditSinkKind, OllamaSummarizerAdapter, ServerConfig, SqliteAuditSink,
    SqliteTextVersionStore, TracingAuditSink, connect_database, init_telemetry,
};
use presentation_http::{
    AppState, create_router, drain_within, set_expose_internal_errors, shutdown_signal,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;

    let _telemetry = init_telemetry(&config.telemetry).context("failed to initialise telemetry")?;
    set_expose_internal_errors(!config.environment.is_production());

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        model = %config.inference.default_model,
        "LexTrack starting"
    );

    let database = connect_database(&config.database)
        .await
        .context("failed to open database")?;

    let audit: Arc<dyn AuditSinkPort> = match config.moderation.audit_sink {
        AuditSinkKind::Database => Arc::new(SqliteAuditSink::new(database.pool().clone())),
        AuditSinkKind::Tracing => Arc::new(TracingAuditSink::new()),
    };

    let moderation = ModerationGate::new(
        Arc::new(PatternScanner::polish()?),
        Arc::new(KeywordScanner::polish_with_extra(
            &config.moderation.extra_keywords,
        )?),
        audit,
    )
    .with_config(config.moderation.to_moderation_config());

    let diffs = DiffService::new(
        Arc::new(SqliteTextVersionStore::new(database.pool().clone())),
        config.diff.to_engine(),
        config.diff.timeout(),
    );

    let summarizer = OllamaSummarizerAdapter::new(config.inference.clone())?;
    let analysis = AnalysisOrchestrator::new(Arc::new(summarizer), config.analysis.to_policy());

    let state = AppState::new(Arc::new(moderation), Arc::new(diffs), Arc::new(analysis))
        .with_database(database.clone())
        .with_trust_forwarded_for(config.server.trust_forwarded_for);

    // First added = innermost
    let mut app = create_router(state)
        .layer(RequestBodyLimitLayer::new(
            config.server.max_body_size_json_bytes,
        ))
        .layer(TraceLayer::new_for_http());
    if config.server.cors_enabled {
        app = app.layer(cors_layer(&config.server));
    }

    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(address = %addr, "Server listening");

    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_secs);
    let stop = CancellationToken::new();
    let mut server = tokio::spawn(
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(stop.clone().cancelled_owned())
        .into_future(),
    );

    tokio::select! {
        joined = &mut server => joined.context("server task failed")??,
        () = shutdown_signal() => {
            stop.cancel();
            if let Some(joined) = drain_within(&mut server, shutdown_timeout).await {
                joined.context("server task failed")??;
            }
        },
    }

    database.close().await;
    info!("Server shutdown complete");
    Ok(())
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    if server.allowed_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = server
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            },
        })
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}
