//! API error handling
//!
//! Maps application errors onto HTTP statuses. Outside development, internal
//! and backend error details are replaced with generic messages.

use std::sync::atomic::{AtomicBool, Ordering};

use application::ApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::{DomainError, RejectionCode};
use serde::Serialize;
use thiserror::Error;

/// Whether internal error details reach the client
static EXPOSE_INTERNAL_ERRORS: AtomicBool = AtomicBool::new(true);

const GENERIC_MESSAGE: &str = "An error occurred processing your request";

/// Fragments that mark a message as leaking paths or backend details
const SENSITIVE_FRAGMENTS: &[&str] = &[
    "/home/",
    "/users/",
    "/var/",
    "/etc/",
    "c:\\",
    "sqlite:",
    "http://",
    "https://",
    "panicked at",
    "stack backtrace",
    ".rs:",
    "connection refused",
];

/// Configure whether internal error details are included in responses
///
/// Disabled in production so backend addresses and file paths stay private.
pub fn set_expose_internal_errors(expose: bool) {
    EXPOSE_INTERNAL_ERRORS.store(expose, Ordering::SeqCst);
}

fn should_expose_details() -> bool {
    EXPOSE_INTERNAL_ERRORS.load(Ordering::SeqCst)
}

fn sanitize_error_message(msg: &str) -> String {
    if should_expose_details() {
        return msg.to_string();
    }

    let lower = msg.to_lowercase();
    if SENSITIVE_FRAGMENTS.iter().any(|f| lower.contains(f)) {
        return GENERIC_MESSAGE.to_string();
    }
    msg.to_string()
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Moderation refused the submission
    #[error("Blocked ({code}): {message}")]
    Blocked {
        code: RejectionCode,
        message: String,
        warnings: Vec<String>,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Body of a moderation rejection
///
/// `message` is user-facing text and is returned verbatim.
#[derive(Debug, Serialize)]
pub struct BlockedResponse {
    pub code: RejectionCode,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            Self::Blocked {
                code,
                message,
                warnings,
            } => {
                let body = BlockedResponse {
                    code,
                    message,
                    warnings,
                };
                return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
            },
            Self::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "bad_request",
                sanitize_error_message(&msg),
                None,
            ),
            Self::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                "not_found",
                sanitize_error_message(&msg),
                None,
            ),
            Self::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "payload_too_large",
                sanitize_error_message(&msg),
                None,
            ),
            Self::ServiceUnavailable(msg) => {
                let message = if should_expose_details() {
                    msg
                } else {
                    "Service temporarily unavailable".to_string()
                };
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "service_unavailable",
                    message,
                    None,
                )
            },
            Self::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred".to_string(),
                should_expose_details().then_some(msg),
            ),
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            details,
        };
        (status, Json(body)).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::ModerationBlocked {
                code,
                message,
                warnings,
            } => Self::Blocked {
                code,
                message,
                warnings,
            },
            ApplicationError::Domain(e) => Self::BadRequest(e.to_string()),
            ApplicationError::Validation(msg) => Self::BadRequest(msg),
            ApplicationError::NotFound(msg) | ApplicationError::DiffComputation(msg) => {
                Self::NotFound(msg)
            },
            ApplicationError::DiffTooLarge(msg) => Self::PayloadTooLarge(msg),
            e @ (ApplicationError::DiffTimeout { .. }
            | ApplicationError::AnalysisFormat(_)
            | ApplicationError::AnalysisTimeout { .. }
            | ApplicationError::ExternalService(_)
            | ApplicationError::Cancelled) => Self::ServiceUnavailable(e.to_string()),
            ApplicationError::Configuration(msg) | ApplicationError::Internal(msg) => {
                Self::Internal(msg)
            },
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApplicationError::from(err).into()
    }
}
