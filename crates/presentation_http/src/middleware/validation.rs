//! Request body validation
//!
//! [`ValidatedJson`] deserializes a JSON body and runs its `validator` rules.
//! Both failure modes answer `400` with `code: "validation_error"`.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] JsonRejection),
    #[error("Validation failed: {0}")]
    Rules(String),
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Json(e) => e.body_text(),
            Self::Rules(msg) => msg.clone(),
        };
        let body = serde_json::json!({
            "error": message,
            "code": "validation_error"
        });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

/// JSON extractor that also runs `Validate`
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidationError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value
            .validate()
            .map_err(|e| ValidationError::Rules(describe(&e)))?;
        Ok(Self(value))
    }
}

/// `field: message` pairs, sorted by field for stable output
fn describe(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string);
                format!("{field}: {message}")
            })
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use axum::{Router, body::Body, routing::post};
    use serde::Deserialize;
    use tower::ServiceExt;

    use super::*;

    #[derive(Debug, Deserialize, Validate)]
    struct Submission {
        #[validate(length(min = 1, max = 32, message = "must be 1-32 characters"))]
        nickname: String,
        #[validate(length(min = 1, message = "must not be empty"))]
        content: String,
    }

    async fn echo(ValidatedJson(req): ValidatedJson<Submission>) -> String {
        req.nickname
    }

    async fn post_body(body: &'static str) -> Response {
        Router::new()
            .route("/submit", post(echo))
            .oneshot(
                axum::http::Request::builder()
                    .method("POST")
                    .uri("/submit")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn valid_body_passes() {
        let response = post_body(r#"{"nickname": "obywatel", "content": "Uwagi"}"#).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn empty_field_rejected() {
        let response = post_body(r#"{"nickname": "obywatel", "content": ""}"#).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_json_rejected_as_validation_error() {
        let response = post_body(r#"{"nickname": "#).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["code"], "validation_error");
    }

    #[tokio::test]
    async fn missing_field_rejected() {
        let response = post_body(r#"{"nickname": "obywatel"}"#).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn describe_lists_every_field() {
        let submission = Submission {
            nickname: String::new(),
            content: String::new(),
        };
        let errors = submission.validate().unwrap_err();
        let text = describe(&errors);
        assert_eq!(
            text,
            "content: must not be empty; nickname: must be 1-32 characters"
        );
    }
}
