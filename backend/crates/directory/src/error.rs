//! Directory Error Types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use auth::AuthError;
use kernel::error::{
    app_error::{AppError, FieldError},
    kind::ErrorKind,
};
use thiserror::Error;

pub type DirectoryResult<T> = Result<T, DirectoryError>;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("User not found")]
    UserNotFound,

    #[error("Current password is incorrect")]
    IncorrectPassword,

    #[error("Invalid query parameter `{0}`")]
    InvalidQuery(&'static str),

    /// Authentication, authorization and shared user-store failures
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl DirectoryError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DirectoryError::UserNotFound => ErrorKind::NotFound,
            DirectoryError::IncorrectPassword | DirectoryError::InvalidQuery(_) => {
                ErrorKind::BadRequest
            }
            DirectoryError::Auth(e) => e.kind(),
        }
    }

    pub fn to_app_error(&self) -> AppError {
        match self {
            DirectoryError::UserNotFound => AppError::not_found("User not found"),
            DirectoryError::IncorrectPassword => AppError::validation(vec![FieldError::new(
                "currentPassword",
                "Current password is incorrect",
            )]),
            DirectoryError::InvalidQuery(field) => AppError::validation(vec![FieldError::new(
                *field,
                format!("Invalid value for {field}"),
            )]),
            DirectoryError::Auth(e) => e.to_app_error(),
        }
    }

    fn log(&self) {
        match self {
            DirectoryError::Auth(AuthError::Database(e)) => {
                tracing::error!(error = %e, "Directory database error");
            }
            DirectoryError::Auth(AuthError::Internal(msg)) => {
                tracing::error!(message = %msg, "Directory internal error");
            }
            DirectoryError::IncorrectPassword => {
                tracing::warn!("Password change with wrong current password");
            }
            _ => {
                tracing::debug!(error = %self, "Directory error");
            }
        }
    }
}

impl IntoResponse for DirectoryError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}
