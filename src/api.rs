//! The JSON response envelope shared by all endpoints.
//!
//! Every response has the shape `{"success": bool, ...}`: successful
//! responses carry a `data` field, failures carry an `error` message and,
//! for validation failures, a `details` list of per-field messages.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// The body of a successful response.
#[derive(Debug, Serialize)]
pub struct ApiSuccessBody<T> {
    /// Always `true`.
    pub success: bool,
    /// The response payload.
    pub data: T,
}

/// The body of a failed response.
#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    /// Always `false`.
    pub success: bool,
    /// A human-readable error message.
    pub error: String,
    /// Per-field validation messages, present for validation failures only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

/// A validation message tied to a single request field.
#[derive(Debug, Serialize)]
pub struct FieldError {
    /// The name of the offending request field.
    pub field: &'static str,
    /// Why the field was rejected.
    pub message: String,
}

impl ApiErrorBody {
    /// Create an error body with a message and no field details.
    pub fn new(error: &str) -> Self {
        Self {
            success: false,
            error: error.to_owned(),
            details: None,
        }
    }

    /// Create an error body with per-field validation messages.
    pub fn with_details(error: &str, details: Vec<FieldError>) -> Self {
        Self {
            success: false,
            error: error.to_owned(),
            details: Some(details),
        }
    }
}

/// A 200 response wrapping `data` in the success envelope.
pub fn ok<T: Serialize>(data: T) -> Response {
    (
        StatusCode::OK,
        Json(ApiSuccessBody {
            success: true,
            data,
        }),
    )
        .into_response()
}

/// A 201 response wrapping `data` in the success envelope.
pub fn created<T: Serialize>(data: T) -> Response {
    (
        StatusCode::CREATED,
        Json(ApiSuccessBody {
            success: true,
            data,
        }),
    )
        .into_response()
}
