//! Result of comparing two text versions

use serde::{Deserialize, Serialize};

use crate::entities::VersionRef;

/// Line-level comparison of two stage texts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResult {
    pub source_version: VersionRef,
    pub target_version: VersionRef,
    /// Unified rendering; empty when the texts are identical
    pub unified_diff: String,
    /// Lines present only in the target
    pub additions: u32,
    /// Lines present only in the source
    pub deletions: u32,
}

impl DiffResult {
    /// True when the two versions have identical lines
    pub const fn is_unchanged(&self) -> bool {
        self.additions == 0 && self.deletions == 0
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::StageId;

    fn reference(order: i32) -> VersionRef {
        VersionRef {
            stage_id: StageId::new(),
            order,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn unchanged_when_no_lines_differ() {
        let diff = DiffResult {
            source_version: reference(1),
            target_version: reference(2),
            unified_diff: String::new(),
            additions: 0,
            deletions: 0,
        };
        assert!(diff.is_unchanged());
    }

    #[test]
    fn serializes_camel_case() {
        let diff = DiffResult {
            source_version: reference(1),
            target_version: reference(2),
            unified_diff: "+a\n".to_string(),
            additions: 1,
            deletions: 0,
        };
        let json = serde_json::to_value(&diff).unwrap();
        assert_eq!(json["unifiedDiff"], "+a\n");
        assert_eq!(json["additions"], 1);
        assert!(json.get("sourceVersion").is_some());
    }
}
