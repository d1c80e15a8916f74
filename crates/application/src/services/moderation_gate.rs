//! Moderation gate - blocks personal data before a comment is stored
//!
//! Pipeline for one (nickname, content) pair:
//!
//! 1. pattern scan of the nickname; a hit rejects and the content is never
//!    looked at
//! 2. pattern scan of the content; a hit rejects
//! 3. keyword scan of the content; hits only add warnings
//!
//! Every rejection and every allow-with-warnings produces exactly one audit
//! event. Audit problems are logged and never change the decision.

use std::{fmt, net::IpAddr, sync::Arc, time::Duration};

use domain::{
    AuditEvent, ModerationAction, ModerationDecision, ModerationVerdict, PersonalDataKind,
    RejectionCode,
};
use tracing::{debug, error, info, instrument};

use crate::{
    error::ApplicationError,
    ports::AuditSinkPort,
    services::{DisclosureScanner, PersonalDataScanner},
};

/// Runtime knobs for the gate
#[derive(Debug, Clone)]
pub struct ModerationConfig {
    /// Upper bound on a single audit append
    pub audit_timeout: Duration,
    /// Also record submissions that passed without findings
    pub audit_clean_events: bool,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            audit_timeout: Duration::from_millis(500),
            audit_clean_events: false,
        }
    }
}

/// Composes the scanners into a blocking decision
pub struct ModerationGate {
    patterns: Arc<dyn PersonalDataScanner>,
    keywords: Arc<dyn DisclosureScanner>,
    audit: Arc<dyn AuditSinkPort>,
    config: ModerationConfig,
}

impl fmt::Debug for ModerationGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModerationGate")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Decision plus the redacted text that may go into the audit trail
struct Assessment {
    decision: ModerationDecision,
    audit_text: String,
}

impl ModerationGate {
    pub fn new(
        patterns: Arc<dyn PersonalDataScanner>,
        keywords: Arc<dyn DisclosureScanner>,
        audit: Arc<dyn AuditSinkPort>,
    ) -> Self {
        Self {
            patterns,
            keywords,
            audit,
            config: ModerationConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ModerationConfig) -> Self {
        self.config = config;
        self
    }

    /// Evaluate a submission and record the audit event
    #[instrument(
        skip(self, nickname, content),
        fields(nickname_len = nickname.len(), content_len = content.len())
    )]
    pub async fn evaluate(
        &self,
        nickname: &str,
        content: &str,
        ip: Option<IpAddr>,
    ) -> ModerationDecision {
        let Assessment {
            decision,
            audit_text,
        } = self.assess(nickname, content);

        match &decision.action {
            ModerationAction::Reject { code, .. } => {
                info!(code = %code, warnings = decision.verdict.warnings().len(), "Submission rejected");
            },
            ModerationAction::Allow => {
                debug!(warnings = decision.verdict.warnings().len(), "Submission allowed");
            },
        }

        self.record(&decision, &audit_text, ip).await;
        decision
    }

    /// Evaluate and turn a rejection into [`ApplicationError::ModerationBlocked`]
    pub async fn check(
        &self,
        nickname: &str,
        content: &str,
        ip: Option<IpAddr>,
    ) -> Result<ModerationVerdict, ApplicationError> {
        let decision = self.evaluate(nickname, content, ip).await;
        match decision.action {
            ModerationAction::Allow => Ok(decision.verdict),
            ModerationAction::Reject { code, message } => Err(ApplicationError::ModerationBlocked {
                code,
                message,
                warnings: decision.verdict.into_warnings(),
            }),
        }
    }

    /// Decision only, without the audit side effect
    pub fn decide(&self, nickname: &str, content: &str) -> ModerationDecision {
        self.assess(nickname, content).decision
    }

    fn assess(&self, nickname: &str, content: &str) -> Assessment {
        if let Some(found) = self.patterns.scan(nickname) {
            let verdict = ModerationVerdict::new(vec![found.warning()], true, String::new());
            return Assessment {
                decision: ModerationDecision::reject(
                    RejectionCode::PersonalDataInNickname,
                    nickname_message(found.kind),
                    verdict,
                ),
                audit_text: self.patterns.redact(nickname),
            };
        }

        let found = self.patterns.scan(content);

        let mut warnings = Vec::new();
        if let Some(found) = found {
            warnings.push(found.warning());
        }
        warnings.extend(self.keywords.scan(content));

        let filtered = if found.is_some() {
            self.patterns.redact(content)
        } else {
            content.to_string()
        };
        let verdict = ModerationVerdict::new(warnings, found.is_some(), filtered.clone());

        let decision = match found {
            Some(found) => ModerationDecision::reject(
                RejectionCode::PersonalDataInContent,
                content_message(found.kind),
                verdict,
            ),
            None => ModerationDecision::allow(verdict),
        };

        Assessment {
            decision,
            audit_text: filtered,
        }
    }

    async fn record(&self, decision: &ModerationDecision, audit_text: &str, ip: Option<IpAddr>) {
        let event = match &decision.action {
            ModerationAction::Reject { code, .. } => AuditEvent::blocked(*code, audit_text),
            ModerationAction::Allow if !decision.verdict.warnings().is_empty() => {
                AuditEvent::warning(audit_text)
            },
            ModerationAction::Allow if self.config.audit_clean_events => {
                AuditEvent::clean(audit_text)
            },
            ModerationAction::Allow => return,
        }
        .with_warnings(decision.verdict.warnings().to_vec())
        .with_ip(ip);

        match tokio::time::timeout(self.config.audit_timeout, self.audit.append(&event)).await {
            Ok(Ok(())) => debug!(event_type = %event.event_type(), "Audit event recorded"),
            Ok(Err(e)) => error!(
                target: "lextrack::audit",
                error = %e,
                event_type = %event.event_type(),
                "Failed to record moderation audit event"
            ),
            Err(_) => error!(
                target: "lextrack::audit",
                timeout_ms = u64::try_from(self.config.audit_timeout.as_millis()).unwrap_or(u64::MAX),
                event_type = %event.event_type(),
                "Timed out recording moderation audit event"
            ),
        }
    }
}

fn nickname_message(kind: PersonalDataKind) -> String {
    format!(
        "Pseudonim wygląda na dane osobowe ({}). Wybierz inny pseudonim.",
        kind.label()
    )
}

fn content_message(kind: PersonalDataKind) -> String {
    format!(
        "Komentarz zawiera dane osobowe ({}). Usuń je przed wysłaniem.",
        kind.label()
    )
}
