//! Moderation, diff and analysis settings.

use std::time::Duration;

use application::{AnalysisPolicy, ModerationConfig, RetryConfig, TextDiffEngine};
use serde::{Deserialize, Serialize};

/// Where moderation audit events are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditSinkKind {
    /// `moderation_audit` table in the configured database
    #[default]
    Database,
    /// Structured log lines on the `lextrack::audit` target
    Tracing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationAppConfig {
    #[serde(default)]
    pub audit_sink: AuditSinkKind,

    /// Upper bound on a single audit write
    #[serde(default = "default_audit_timeout_ms")]
    pub audit_timeout_ms: u64,

    #[serde(default)]
    pub audit_clean_events: bool,

    /// Retention used by `lextrack-cli audit-purge` when no value is given
    #[serde(default = "default_audit_retention_days")]
    pub audit_retention_days: u32,

    /// Phrases added to the built-in self-disclosure list
    #[serde(default)]
    pub extra_keywords: Vec<String>,
}

const fn default_audit_timeout_ms() -> u64 {
    500
}

const fn default_audit_retention_days() -> u32 {
    90
}

impl Default for ModerationAppConfig {
    fn default() -> Self {
        Self {
            audit_sink: AuditSinkKind::default(),
            audit_timeout_ms: default_audit_timeout_ms(),
            audit_clean_events: false,
            audit_retention_days: default_audit_retention_days(),
            extra_keywords: Vec::new(),
        }
    }
}

impl ModerationAppConfig {
    #[must_use]
    pub const fn to_moderation_config(&self) -> ModerationConfig {
        ModerationConfig {
            audit_timeout: Duration::from_millis(self.audit_timeout_ms),
            audit_clean_events: self.audit_clean_events,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffAppConfig {
    /// Wall-clock budget for one comparison
    #[serde(default = "default_diff_timeout_ms")]
    pub timeout_ms: u64,

    /// Unchanged lines shown around each hunk
    #[serde(default = "default_context_lines")]
    pub context_lines: usize,

    /// Refuse comparisons whose line table would exceed this many cells
    #[serde(default = "default_max_table_cells")]
    pub max_table_cells: usize,
}

const fn default_diff_timeout_ms() -> u64 {
    5_000
}

const fn default_context_lines() -> usize {
    3
}

const fn default_max_table_cells() -> usize {
    25_000_000
}

impl Default for DiffAppConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_diff_timeout_ms(),
            context_lines: default_context_lines(),
            max_table_cells: default_max_table_cells(),
        }
    }
}

impl DiffAppConfig {
    #[must_use]
    pub const fn to_engine(&self) -> TextDiffEngine {
        TextDiffEngine::new(self.context_lines, self.max_table_cells)
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisAppConfig {
    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default = "default_attempt_timeout_ms")]
    pub attempt_timeout_ms: u64,

    #[serde(default = "default_total_timeout_ms")]
    pub total_timeout_ms: u64,

    #[serde(default = "default_max_prompt_diff_chars")]
    pub max_prompt_diff_chars: usize,
}

const fn default_attempt_timeout_ms() -> u64 {
    30_000
}

const fn default_total_timeout_ms() -> u64 {
    90_000
}

const fn default_max_prompt_diff_chars() -> usize {
    12_000
}

impl Default for AnalysisAppConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            attempt_timeout_ms: default_attempt_timeout_ms(),
            total_timeout_ms: default_total_timeout_ms(),
            max_prompt_diff_chars: default_max_prompt_diff_chars(),
        }
    }
}

impl AnalysisAppConfig {
    #[must_use]
    pub fn to_policy(&self) -> AnalysisPolicy {
        AnalysisPolicy {
            retry: self.retry.clone(),
            attempt_timeout: Duration::from_millis(self.attempt_timeout_ms),
            total_timeout: Duration::from_millis(self.total_timeout_ms),
            max_prompt_diff_chars: self.max_prompt_diff_chars,
        }
    }
}
