//! Value Objects - Immutable, identity-less domain primitives

mod personal_data_kind;
mod phase_id;
mod rejection_code;
mod stage_id;

pub use personal_data_kind::PersonalDataKind;
pub use phase_id::PhaseId;
pub use rejection_code::RejectionCode;
pub use stage_id::StageId;
