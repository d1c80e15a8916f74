//! Domain entities - Objects with identity and lifecycle

mod analysis;
mod audit_event;
mod diff_result;
mod moderation;
mod text_version;

pub use analysis::{
    AnalysisContext, AnalysisKind, AnalysisOutcome, AnalysisPayload, AnalysisResult,
    DiffAnalysisResult,
};
pub use audit_event::{AUDIT_CONTENT_LIMIT, AuditEvent, AuditEventType, truncate_chars};
pub use diff_result::DiffResult;
pub use moderation::{ModerationAction, ModerationDecision, ModerationVerdict};
pub use text_version::{TextVersion, VersionRef};
