//! Privacy-preserving moderation audit record
//!
//! Every constructor funnels content through [`truncate_chars`], so an
//! `AuditEvent` never holds more than [`AUDIT_CONTENT_LIMIT`] characters of
//! user text regardless of which sink it ends up in.

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::RejectionCode;

/// Maximum number of characters of user content kept in an audit record
pub const AUDIT_CONTENT_LIMIT: usize = 100;

/// Type of moderation audit event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    /// Submission rejected
    Blocked,
    /// Submission allowed with advisory warnings
    Warning,
    /// Submission allowed without findings
    Clean,
}

impl AuditEventType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blocked => "blocked",
            Self::Warning => "warning",
            Self::Clean => "clean",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "blocked" => Some(Self::Blocked),
            "warning" => Some(Self::Warning),
            "clean" => Some(Self::Clean),
            _ => None,
        }
    }
}

impl std::fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Truncate to at most `limit` characters on a char boundary
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Audit record emitted by the moderation gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    timestamp: DateTime<Utc>,
    event_type: AuditEventType,
    truncated_content: String,
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ip: Option<IpAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<RejectionCode>,
}

impl AuditEvent {
    /// Create an event, truncating `content` to the audit limit
    pub fn new(event_type: AuditEventType, content: &str) -> Self {
        Self {
            id: None,
            timestamp: Utc::now(),
            event_type,
            truncated_content: truncate_chars(content, AUDIT_CONTENT_LIMIT),
            warnings: Vec::new(),
            ip: None,
            code: None,
        }
    }

    pub fn blocked(code: RejectionCode, content: &str) -> Self {
        Self::new(AuditEventType::Blocked, content).with_code(code)
    }

    pub fn warning(content: &str) -> Self {
        Self::new(AuditEventType::Warning, content)
    }

    pub fn clean(content: &str) -> Self {
        Self::new(AuditEventType::Clean, content)
    }

    #[must_use]
    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    #[must_use]
    pub const fn with_ip(mut self, ip: Option<IpAddr>) -> Self {
        self.ip = ip;
        self
    }

    #[must_use]
    pub const fn with_code(mut self, code: RejectionCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Attach the storage-assigned id
    #[must_use]
    pub const fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub const fn id(&self) -> Option<i64> {
        self.id
    }

    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub const fn event_type(&self) -> AuditEventType {
        self.event_type
    }

    pub fn truncated_content(&self) -> &str {
        &self.truncated_content
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub const fn ip(&self) -> Option<IpAddr> {
        self.ip
    }

    pub const fn code(&self) -> Option<RejectionCode> {
        self.code
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    #[test]
    fn content_is_truncated_to_limit() {
        let long = "a".repeat(250);
        let event = AuditEvent::warning(&long);
        assert_eq!(event.truncated_content().chars().count(), AUDIT_CONTENT_LIMIT);
    }

    #[test]
    fn truncation_respects_multibyte_chars() {
        let long = "ż".repeat(150);
        let event = AuditEvent::warning(&long);
        assert_eq!(event.truncated_content().chars().count(), 100);
        assert!(event.truncated_content().chars().all(|c| c == 'ż'));
    }

    #[test]
    fn short_content_is_kept() {
        let event = AuditEvent::clean("Dzień dobry");
        assert_eq!(event.truncated_content(), "Dzień dobry");
        assert_eq!(event.event_type(), AuditEventType::Clean);
    }

    #[test]
    fn blocked_carries_code() {
        let event = AuditEvent::blocked(RejectionCode::PersonalDataInNickname, "nick");
        assert_eq!(event.event_type(), AuditEventType::Blocked);
        assert_eq!(event.code(), Some(RejectionCode::PersonalDataInNickname));
    }

    #[test]
    fn builder_pattern() {
        let ip = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1));
        let event = AuditEvent::warning("tekst")
            .with_warnings(vec!["w1".to_string()])
            .with_ip(Some(ip))
            .with_id(7);
        assert_eq!(event.ip(), Some(ip));
        assert_eq!(event.warnings(), ["w1".to_string()]);
        assert_eq!(event.id(), Some(7));
    }

    #[test]
    fn truncate_chars_exact_boundary() {
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("abcd", 3), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn event_type_parse_roundtrip() {
        for t in [AuditEventType::Blocked, AuditEventType::Warning, AuditEventType::Clean] {
            assert_eq!(AuditEventType::parse(t.as_str()), Some(t));
        }
        assert_eq!(AuditEventType::parse("other"), None);
    }
}
