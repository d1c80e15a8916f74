//! Structured analysis of legislative changes
//!
//! The summarization collaborator returns one of two shapes depending on the
//! requested [`AnalysisKind`]. Both are normalised before being handed out:
//! text fields are trimmed and must be non-empty, list entries are trimmed
//! and blank entries dropped.

use serde::{Deserialize, Serialize};

use crate::{entities::DiffResult, errors::DomainError};

/// Which structured result the caller wants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    /// Plain-language summary of the target text and its effects
    Summary,
    /// Explanation focused on what the diff changes
    #[default]
    DiffExplanation,
}

/// Legislative labels used when building the prompt
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisContext {
    pub law_title: String,
    pub phase_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_label: Option<String>,
}

impl AnalysisContext {
    pub fn new(law_title: impl Into<String>, phase_name: impl Into<String>) -> Self {
        Self {
            law_title: law_title.into(),
            phase_name: phase_name.into(),
            stage_label: None,
        }
    }

    #[must_use]
    pub fn with_stage_label(mut self, label: impl Into<String>) -> Self {
        self.stage_label = Some(label.into());
        self
    }
}

/// Summary of a law text version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: String,
    #[serde(default)]
    pub changes: Vec<String>,
    #[serde(default)]
    pub effects: Vec<String>,
    #[serde(alias = "simplified_explanation")]
    pub simplified_explanation: String,
}

impl AnalysisResult {
    /// Trim fields and reject empty required text
    pub fn normalized(self) -> Result<Self, DomainError> {
        Ok(Self {
            summary: required("summary", &self.summary)?,
            changes: clean_list(self.changes),
            effects: clean_list(self.effects),
            simplified_explanation: required("simplifiedExplanation", &self.simplified_explanation)?,
        })
    }
}

/// Explanation of a diff between two versions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffAnalysisResult {
    pub explanation: String,
    #[serde(default, alias = "key_changes")]
    pub key_changes: Vec<String>,
    pub impact: String,
}

impl DiffAnalysisResult {
    /// Trim fields and reject empty required text
    pub fn normalized(self) -> Result<Self, DomainError> {
        Ok(Self {
            explanation: required("explanation", &self.explanation)?,
            key_changes: clean_list(self.key_changes),
            impact: required("impact", &self.impact)?,
        })
    }
}

/// Either analysis shape, tagged by kind on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisPayload {
    Summary(AnalysisResult),
    DiffExplanation(DiffAnalysisResult),
}

impl AnalysisPayload {
    pub const fn kind(&self) -> AnalysisKind {
        match self {
            Self::Summary(_) => AnalysisKind::Summary,
            Self::DiffExplanation(_) => AnalysisKind::DiffExplanation,
        }
    }
}

/// Terminal state of an analysis run
///
/// The diff is carried in both states: analysis problems never take the
/// diff away from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    Succeeded {
        diff: DiffResult,
        analysis: AnalysisPayload,
        attempts: u32,
    },
    Degraded {
        diff: DiffResult,
        reason: String,
        attempts: u32,
    },
}

impl AnalysisOutcome {
    pub const fn analysis_available(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    pub const fn diff(&self) -> &DiffResult {
        match self {
            Self::Succeeded { diff, .. } | Self::Degraded { diff, .. } => diff,
        }
    }

    pub const fn analysis(&self) -> Option<&AnalysisPayload> {
        match self {
            Self::Succeeded { analysis, .. } => Some(analysis),
            Self::Degraded { .. } => None,
        }
    }

    /// Number of collaborator calls made
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Succeeded { attempts, .. } | Self::Degraded { attempts, .. } => *attempts,
        }
    }
}

fn required(field: &str, value: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidAnalysis(format!("{field} is empty")));
    }
    Ok(trimmed.to_string())
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
