//! LexTrack CLI
//!
//! Local moderation and diff checks plus audit-log maintenance.

#![allow(clippy::print_stdout)]

mod audit;

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

use anyhow::Context;
use application::{InMemoryAuditSink, KeywordScanner, ModerationGate, PatternScanner, TextDiffEngine};
use clap::{Parser, Subcommand};
use infrastructure::{AppConfig, connect_database};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit code for a refused submission or differing texts
const FINDINGS_EXIT: u8 = 2;

#[derive(Parser)]
#[command(name = "lextrack-cli")]
#[command(author, version, about = "LexTrack administration CLI", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (defaults to ./config.toml when present)
    #[arg(short, long, global = true, env = "LEXTRACK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the moderation rules over a submission without recording it
    ///
    /// Exits with 2 when the submission would be rejected.
    Moderate {
        /// Comment body
        content: String,

        #[arg(short, long, default_value = "anonim")]
        nickname: String,
    },

    /// Line diff of two text files
    ///
    /// Exits with 2 when the files differ, like diff(1).
    Diff {
        source: PathBuf,
        target: PathBuf,

        /// Unchanged lines shown around each change
        #[arg(short = 'U', long)]
        context: Option<usize>,
    },

    /// Show the most recent moderation audit events
    AuditRecent {
        #[arg(short, long, default_value = "20")]
        limit: u32,
    },

    /// Delete moderation audit events older than the retention period
    AuditPurge {
        /// Retention in days (defaults to moderation.audit_retention_days)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        days: Option<u32>,
    },

    /// Check server readiness (used by container health checks)
    Health {
        /// Server URL
        #[arg(short, long, default_value = "http://localhost:3000")]
        url: String,
    },
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    config.context("failed to load configuration")
}

fn findings(found: bool) -> ExitCode {
    if found {
        ExitCode::from(FINDINGS_EXIT)
    } else {
        ExitCode::SUCCESS
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(log_filter_from_verbosity(cli.verbose)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Moderate { content, nickname } => {
            let config = load_config(cli.config.as_deref())?;
            let gate = ModerationGate::new(
                Arc::new(PatternScanner::polish()?),
                Arc::new(KeywordScanner::polish_with_extra(
                    &config.moderation.extra_keywords,
                )?),
                Arc::new(InMemoryAuditSink::new()),
            );

            let decision = gate.decide(&nickname, &content);
            println!("{}", serde_json::to_string_pretty(&decision)?);
            Ok(findings(!decision.is_allowed()))
        },

        Commands::Diff {
            source,
            target,
            context,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let engine = match context {
                Some(lines) => TextDiffEngine::new(lines, config.diff.max_table_cells),
                None => config.diff.to_engine(),
            };

            let source_text = tokio::fs::read_to_string(&source)
                .await
                .with_context(|| format!("failed to read {}", source.display()))?;
            let target_text = tokio::fs::read_to_string(&target)
                .await
                .with_context(|| format!("failed to read {}", target.display()))?;

            let diff = engine.diff(&source_text, &target_text)?;
            if !diff.is_unchanged() {
                println!("--- {}", source.display());
                println!("+++ {}", target.display());
                print!("{}", diff.to_unified(engine.context_lines()));
            }
            Ok(findings(!diff.is_unchanged()))
        },

        Commands::AuditRecent { limit } => {
            let config = load_config(cli.config.as_deref())?;
            let db = connect_database(&config.database)
                .await
                .context("failed to open database")?;

            for event in audit::recent(&db, limit).await? {
                println!("{}", serde_json::to_string(&event)?);
            }
            db.close().await;
            Ok(ExitCode::SUCCESS)
        },

        Commands::AuditPurge { days } => {
            let config = load_config(cli.config.as_deref())?;
            let days = days.unwrap_or(config.moderation.audit_retention_days);
            let db = connect_database(&config.database)
                .await
                .context("failed to open database")?;

            let removed = audit::purge(&db, days).await?;
            println!("Removed {removed} audit event(s) older than {days} day(s)");
            db.close().await;
            Ok(ExitCode::SUCCESS)
        },

        Commands::Health { url } => {
            let client = reqwest::Client::new();
            match client.get(endpoint_url(&url, "/ready")).send().await {
                Ok(resp) if resp.status().is_success() => {
                    println!("Healthy");
                    Ok(ExitCode::SUCCESS)
                },
                Ok(resp) => {
                    println!("Unhealthy: HTTP {}", resp.status());
                    Ok(ExitCode::FAILURE)
                },
                Err(e) => {
                    println!("Unhealthy: {e}");
                    Ok(ExitCode::FAILURE)
                },
            }
        },
    }
}
