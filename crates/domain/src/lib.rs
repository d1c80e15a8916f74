//! Domain layer for LexTrack
//!
//! Contains the value objects and entities shared by the moderation gate and
//! the version-diff pipeline. This layer performs no I/O.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
