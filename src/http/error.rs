//! Mapping from registry errors to HTTP responses.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::guard::GuardError;
use crate::registry::RegistryError;

/// An error that knows its status code and JSON body.
#[derive(Debug)]
pub enum ApiError {
    Registry(RegistryError),
    /// The request could not be decoded at all.
    BadRequest(String),
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        ApiError::Registry(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    /// Status code and body for this error.
    ///
    /// Both conflict kinds are 409; a stale version is told apart by the
    /// `currentVersion` field.
    pub fn parts(&self) -> (StatusCode, Value) {
        let err = match self {
            ApiError::BadRequest(message) => {
                return (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
            ApiError::Registry(err) => err,
        };

        match err {
            RegistryError::Invalid(e) => (StatusCode::BAD_REQUEST, json!({ "error": e.to_string() })),
            RegistryError::Query(e) => (StatusCode::BAD_REQUEST, json!({ "error": e.to_string() })),
            RegistryError::NotFound(_) | RegistryError::Guard(GuardError::NotFound(_)) => (
                StatusCode::NOT_FOUND,
                json!({ "error": "Member not found" }),
            ),
            RegistryError::Guard(e @ GuardError::Locked { .. }) => (
                StatusCode::CONFLICT,
                json!({ "error": e.to_string(), "locked": true }),
            ),
            RegistryError::Guard(e @ GuardError::StaleVersion { current, .. }) => (
                StatusCode::CONFLICT,
                json!({ "error": e.to_string(), "currentVersion": current }),
            ),
            RegistryError::Guard(GuardError::Store(e)) | RegistryError::Store(e) => {
                tracing::error!(error = %e, "member store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.parts();
        (status, Json(body)).into_response()
    }
}
