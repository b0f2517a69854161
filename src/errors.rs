use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::domain::errors::{DomainError, FieldError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid input")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound(_) => AppError::NotFound(e.to_string()),
            DomainError::Validation(fields) => AppError::Validation(fields),
            DomainError::Internal(msg) => AppError::Internal(msg),
            DomainError::ProductNotFound(_)
            | DomainError::InsufficientStock { .. }
            | DomainError::Conflict(_)
            | DomainError::ProductInUse
            | DomainError::AlreadyCompleted
            | DomainError::OrderLocked => AppError::BadRequest(e.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Encoding(msg) => AppError::Internal(msg),
            AuthError::Store(e) => e.into(),
            other => AppError::Unauthorized(other.to_string()),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        match self {
            AppError::Validation(fields) => builder.json(json!({
                "detail": self.to_string(),
                "errors": fields,
            })),
            AppError::Unauthorized(_) => builder
                .insert_header(("WWW-Authenticate", "Bearer"))
                .json(json!({ "detail": self.to_string() })),
            AppError::Internal(msg) => {
                log::error!("request failed: {msg}");
                builder.json(json!({ "detail": "Internal server error" }))
            }
            _ => builder.json(json!({ "detail": self.to_string() })),
        }
    }
}
