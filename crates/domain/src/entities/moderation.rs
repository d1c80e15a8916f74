//! Moderation verdicts and gate decisions

use serde::Serialize;

use crate::value_objects::RejectionCode;

/// Outcome of scanning one submission
///
/// `is_clean` is derived from the other fields at construction time and the
/// fields are private, so `is_clean == !contains_personal_data && warnings.is_empty()`
/// holds for every value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationVerdict {
    is_clean: bool,
    warnings: Vec<String>,
    contains_personal_data: bool,
    filtered_content: String,
}

impl ModerationVerdict {
    pub fn new(
        warnings: Vec<String>,
        contains_personal_data: bool,
        filtered_content: impl Into<String>,
    ) -> Self {
        Self {
            is_clean: !contains_personal_data && warnings.is_empty(),
            warnings,
            contains_personal_data,
            filtered_content: filtered_content.into(),
        }
    }

    /// A verdict with nothing detected
    pub fn clean(filtered_content: impl Into<String>) -> Self {
        Self::new(Vec::new(), false, filtered_content)
    }

    pub const fn is_clean(&self) -> bool {
        self.is_clean
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub const fn contains_personal_data(&self) -> bool {
        self.contains_personal_data
    }

    /// Content with personal-data occurrences replaced by markers
    pub fn filtered_content(&self) -> &str {
        &self.filtered_content
    }

    pub fn into_warnings(self) -> Vec<String> {
        self.warnings
    }
}

/// What the gate decided to do with a submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ModerationAction {
    Allow,
    Reject {
        code: RejectionCode,
        message: String,
    },
}

/// Action plus the verdict it was derived from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModerationDecision {
    pub action: ModerationAction,
    pub verdict: ModerationVerdict,
}

impl ModerationDecision {
    pub const fn allow(verdict: ModerationVerdict) -> Self {
        Self {
            action: ModerationAction::Allow,
            verdict,
        }
    }

    pub fn reject(
        code: RejectionCode,
        message: impl Into<String>,
        verdict: ModerationVerdict,
    ) -> Self {
        Self {
            action: ModerationAction::Reject {
                code,
                message: message.into(),
            },
            verdict,
        }
    }

    pub const fn is_allowed(&self) -> bool {
        matches!(self.action, ModerationAction::Allow)
    }

    /// Rejection code, if the submission was refused
    pub const fn rejection_code(&self) -> Option<RejectionCode> {
        match &self.action {
            ModerationAction::Reject { code, .. } => Some(*code),
            ModerationAction::Allow => None,
        }
    }
}
