//! Application services - Use case implementations

mod analysis_orchestrator;
pub mod analysis_prompt;
mod diff_service;
mod keyword_scanner;
mod moderation_gate;
mod pattern_scanner;
pub mod text_diff;

pub use analysis_orchestrator::{AnalysisOrchestrator, AnalysisPolicy};
pub use diff_service::DiffService;
#[cfg(test)]
pub use keyword_scanner::MockDisclosureScanner;
pub use keyword_scanner::{DisclosureScanner, KeywordScanner, POLISH_KEYWORDS};
pub use moderation_gate::{ModerationConfig, ModerationGate};
#[cfg(test)]
pub use pattern_scanner::MockPersonalDataScanner;
pub use pattern_scanner::{PatternMatch, PatternScanner, PersonalDataScanner, POLISH_PATTERNS};
pub use text_diff::{Deadline, DiffLine, LineDiff, LineOp, TextDiffEngine};
