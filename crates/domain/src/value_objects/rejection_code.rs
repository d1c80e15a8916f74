//! Machine-readable reasons for a moderation rejection

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why the moderation gate refused a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionCode {
    /// The nickname itself looks like personal data
    PersonalDataInNickname,
    /// The comment body contains personal data
    PersonalDataInContent,
}

impl RejectionCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PersonalDataInNickname => "PERSONAL_DATA_IN_NICKNAME",
            Self::PersonalDataInContent => "PERSONAL_DATA_IN_CONTENT",
        }
    }

    /// Parse the wire representation back into a code
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PERSONAL_DATA_IN_NICKNAME" => Some(Self::PersonalDataInNickname),
            "PERSONAL_DATA_IN_CONTENT" => Some(Self::PersonalDataInContent),
            _ => None,
        }
    }
}

impl fmt::Display for RejectionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
