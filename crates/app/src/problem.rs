use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use product_catalog_core::{ApiErrorBody, FieldErrors};

pub const VALIDATION_FAILED: &str = "Validation failed";

/// Error response carrying the shared `{ message, errors }` body.
#[derive(Debug)]
pub struct ProblemResponse {
    status: StatusCode,
    body: ApiErrorBody,
}

impl ProblemResponse {
    pub fn new<S: Into<String>>(status: StatusCode, message: S) -> Self {
        Self {
            status,
            body: ApiErrorBody::new(message),
        }
    }

    /// 400 listing every rejected field.
    pub fn validation(errors: FieldErrors) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ApiErrorBody::with_errors(VALIDATION_FAILED, errors),
        }
    }

    /// 400 scoped to a single field, with the field message doubling as summary.
    pub fn field(field: &str, message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ApiErrorBody::with_errors(message, FieldErrors::single(field, message)),
        }
    }

    /// 500 with a caller-safe message; details belong in the server log only.
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ProblemResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
