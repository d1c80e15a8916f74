//! LexTrack HTTP presentation layer
//!
//! Exposes the moderation gate and the diff/analysis pipeline over a JSON API.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod shutdown;
pub mod state;

pub use error::{ApiError, set_expose_internal_errors};
pub use middleware::{ClientIp, ValidatedJson, ValidationError};
pub use routes::create_router;
pub use shutdown::{drain_within, shutdown_signal};
pub use state::AppState;
