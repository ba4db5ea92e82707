//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{
    app_error::{AppError, FieldError},
    kind::ErrorKind,
};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email, wrong password or inactive account. Never says which.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// No usable `Authorization: Bearer` header
    #[error("Authorization header is required")]
    MissingBearer,

    /// Access token failed verification
    #[error("Invalid or expired token")]
    Unauthenticated,

    /// Authenticated, but role or ownership check failed
    #[error("Forbidden")]
    Forbidden,

    /// Refresh token unknown, unparsable or badly signed
    #[error("Invalid refresh token")]
    InvalidToken,

    #[error("Refresh token has expired")]
    ExpiredToken,

    #[error("Refresh token has been revoked")]
    RevokedToken,

    #[error("User not found")]
    UserNotFound,

    #[error("Email already exists")]
    EmailTaken,

    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Single-field validation error
    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        AuthError::Validation(vec![FieldError::new(field, message.into())])
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials
            | AuthError::MissingBearer
            | AuthError::Unauthenticated
            | AuthError::InvalidToken
            | AuthError::ExpiredToken
            | AuthError::RevokedToken => ErrorKind::Unauthorized,
            AuthError::Forbidden => ErrorKind::Forbidden,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::EmailTaken => ErrorKind::Conflict,
            AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError. Server-side details stay out of the body.
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::Validation(errors) => AppError::validation(errors.clone()),
            AuthError::Database(_) | AuthError::Internal(_) => {
                AppError::internal("Internal server error")
            }
            AuthError::InvalidCredentials => AppError::new(self.kind(), self.to_string())
                .with_action("Check your email and password"),
            AuthError::ExpiredToken | AuthError::RevokedToken => {
                AppError::new(self.kind(), self.to_string()).with_action("Please log in again")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    pub(crate) fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::RevokedToken => {
                tracing::warn!("Revoked refresh token presented");
            }
            AuthError::Forbidden => {
                tracing::info!("Access denied by role or ownership policy");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest => AuthError::Validation(err.field_errors().to_vec()),
            _ => AuthError::Internal(err.to_string()),
        }
    }
}
