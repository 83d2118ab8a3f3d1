//! Error handling for the lexdesk API
//!
//! Handlers and services return `ApiResult<T>`. An `AppError` renders as a
//! JSON `ApiError` body with the matching HTTP status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::store::StoreError;

pub type FieldErrors = HashMap<String, Vec<String>>;

/// Error body sent to API clients
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    /// Machine-readable code such as `NOT_FOUND` or `VALIDATION_ERROR`
    pub code: String,
    pub message: String,
    /// Per-field messages, only present for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<FieldErrors>,
    /// RFC 3339
    pub timestamp: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// `resource` is the display name, e.g. "Case" gives "Case not found".
    pub fn not_found(resource: impl Into<String>) -> AppError {
        AppError::NotFound(resource.into())
    }

    pub fn bad_request(message: impl Into<String>) -> AppError {
        AppError::BadRequest(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> AppError {
        AppError::Forbidden(message.into())
    }

    pub fn internal(message: impl Into<String>) -> AppError {
        AppError::InternalError(message.into())
    }

    /// A 422 carrying a single field error.
    pub fn invalid_field(field: &str, message: &str) -> AppError {
        AppError::ValidationError {
            details: FieldErrors::from([(field.to_string(), vec![message.to_string()])]),
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    Unauthorized(String),
    TokenExpired,
    Forbidden(String),
    NotFound(String),
    BadRequest(String),
    ValidationError { details: FieldErrors },
    InternalError(String),
    DatabaseError(String),
}

impl AppError {
    fn describe(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::TokenExpired => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::ValidationError { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            Self::DatabaseError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.describe().0
    }

    pub fn error_code(&self) -> &'static str {
        self.describe().1
    }

    /// Client-facing message. Server-side failures are logged here and
    /// replaced by a generic text.
    pub fn message(&self) -> String {
        match self {
            Self::Unauthorized(msg) | Self::Forbidden(msg) | Self::BadRequest(msg) => msg.clone(),
            Self::TokenExpired => "Authentication token has expired".to_string(),
            Self::NotFound(resource) => format!("{} not found", resource),
            Self::ValidationError { .. } => "Validation failed".to_string(),
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
            Self::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                "A database error occurred".to_string()
            }
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut body = ApiError::new(self.error_code(), self.message());
        if let Self::ValidationError { details } = self {
            body.details = Some(details);
        }
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(resource) => Self::NotFound(resource),
            StoreError::Invalid(msg) => Self::BadRequest(msg),
            StoreError::Database(e) => Self::DatabaseError(e.to_string()),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => Self::TokenExpired,
            _ => Self::Unauthorized(format!("Invalid token: {}", err)),
        }
    }
}

pub type ApiResult<T> = Result<T, AppError>;

/// Collects field errors and turns them into a single 422.
#[derive(Default)]
pub struct ValidationBuilder {
    details: FieldErrors,
}

impl ValidationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(mut self, field: &str, message: &str) -> Self {
        self.details
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
        self
    }

    /// Record `message` against `field` when `failed` holds.
    pub fn check(self, failed: bool, field: &str, message: &str) -> Self {
        if failed { self.error(field, message) } else { self }
    }

    pub fn build(self) -> Option<AppError> {
        (!self.details.is_empty()).then_some(AppError::ValidationError {
            details: self.details,
        })
    }

    pub fn finish(self) -> ApiResult<()> {
        self.build().map_or(Ok(()), Err)
    }
}
