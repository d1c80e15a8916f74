//! Application layer - Use cases and orchestration
//!
//! Hosts the moderation gate with its scanners, the line diff engine and the
//! analysis orchestrator, plus the ports their adapters implement.

pub mod error;
pub mod ports;
pub mod retry;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use retry::{RetryConfig, RetryResult, Retryable, with_retry};
pub use services::*;
