use std::any::Any;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use survey_api_types::ErrorResponse;
use survey_core::domain::DomainError;
use tracing::error;

use crate::error::ServiceError;

/// Error returned by every handler, rendered as `{code, message}`.
#[derive(Debug)]
pub struct ApiError {
    message: String,
    code: &'static str,
    status: StatusCode,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
            status,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "internal server error",
        )
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let (status, code) = match &err {
            DomainError::QuestionNotFound(_) => (StatusCode::NOT_FOUND, "QUESTION_NOT_FOUND"),
            DomainError::NameMismatch => (StatusCode::BAD_REQUEST, "NAME_MISMATCH"),
            DomainError::IdNumberTaken => (StatusCode::BAD_REQUEST, "ID_NUMBER_TAKEN"),
            DomainError::TypeMismatch { .. } => (StatusCode::BAD_REQUEST, "TYPE_MISMATCH"),
            DomainError::MissingPosition { .. } => (StatusCode::BAD_REQUEST, "MISSING_QUESTION"),
            DomainError::UnsupportedQuestionType(_) => {
                (StatusCode::BAD_REQUEST, "UNSUPPORTED_QUESTION_TYPE")
            }
            _ => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
        };
        Self::new(status, code, err.to_string())
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(err) => err.into(),
            ServiceError::NotFound(message) => Self::not_found(message),
            ServiceError::Conflict(message) => Self::new(StatusCode::CONFLICT, "CONFLICT", message),
            ServiceError::Unauthorized(message) => {
                Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
            }
            ServiceError::Forbidden(message) => Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message),
            ServiceError::Database(err) => {
                error!(error = %err, "database error");
                Self::internal()
            }
            ServiceError::Internal(err) => {
                error!(error = ?err, "internal error");
                Self::internal()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match &rejection {
            JsonRejection::MissingJsonContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::new(status, "INVALID_BODY", rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_PATH", rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_QUERY", rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            code: self.code.to_string(),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Renders a handler panic as a JSON 500.
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = detail, "handler panicked");

    ApiError::internal().into_response()
}
