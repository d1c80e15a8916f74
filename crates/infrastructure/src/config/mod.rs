//! Application configuration
//!
//! Sources, in increasing precedence:
//! - built-in defaults
//! - `config.toml` in the working directory (or an explicit file)
//! - `LEXTRACK_*` environment variables, `__` separating sections
//!   (e.g. `LEXTRACK_SERVER__PORT=8080`)

mod database;
mod pipeline;
mod server;

use std::{fmt, path::Path};

use ai_core::InferenceConfig;
use serde::{Deserialize, Serialize};

use crate::telemetry::TelemetryConfig;

pub use database::DatabaseConfig;
pub use pipeline::{AnalysisAppConfig, AuditSinkKind, DiffAppConfig, ModerationAppConfig};
pub use server::ServerConfig;

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

const ENV_PREFIX: &str = "LEXTRACK";

/// Application environment
///
/// Production hides internal error details from API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(format!(
                "Invalid environment: {s}. Use 'development' or 'production'"
            )),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: Environment,

    #[serde(default)]
    pub server: ServerConfig,

    /// Summarization backend
    #[serde(default)]
    pub inference: InferenceConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub moderation: ModerationAppConfig,

    #[serde(default)]
    pub diff: DiffAppConfig,

    #[serde(default)]
    pub analysis: AnalysisAppConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load from `config.toml` (optional) and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::build(config::File::with_name("config").required(false))
    }

    /// Load from an explicit file, which must exist, plus the environment
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        Self::build(config::File::from(path).required(true))
    }

    fn build(
        file: config::File<config::FileSourceFile, config::FileFormat>,
    ) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("inference.base_url", "http://localhost:11434")?
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("moderation.extra_keywords")
                    .with_list_parse_key("server.allowed_origins"),
            )
            .build()?;

        let app: Self = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    /// Reject settings that would make the pipeline unusable
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.diff.timeout_ms == 0 {
            return Err(config::ConfigError::Message(
                "diff.timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.analysis.total_timeout_ms < self.analysis.attempt_timeout_ms {
            return Err(config::ConfigError::Message(
                "analysis.total_timeout_ms must not be shorter than analysis.attempt_timeout_ms"
                    .to_string(),
            ));
        }
        if self.moderation.extra_keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(config::ConfigError::Message(
                "moderation.extra_keywords must not contain blank entries".to_string(),
            ));
        }
        Ok(())
    }
}
