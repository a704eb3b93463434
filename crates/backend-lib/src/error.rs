// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use identity_common::ApiResponse;
use thiserror::Error;

/// Application error types with status and machine-readable codes
#[derive(Error, Debug)]
pub enum AppError {
    #[error("authorization header not found")]
    MissingAuthHeader,

    #[error("invalid auth scheme")]
    InvalidAuthScheme,

    #[error("invalid token")]
    InvalidToken,

    #[error("invalid password entered, {remaining} login attempts remaining")]
    InvalidPassword { remaining: u32 },

    #[error("account locked after {threshold} failed login attempts, 0 login attempts remaining")]
    LockedOut { threshold: u32 },

    #[error("an identity with matching details exists")]
    IdentityExists,

    #[error("account with id: ({0}) does not exist")]
    AccountNotFound(String),

    #[error("{0}")]
    ActionNotAllowed(String),

    #[error("you do not have permission to access this route")]
    PermissionDenied,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingAuthHeader
            | AppError::InvalidAuthScheme
            | AppError::InvalidToken
            | AppError::PermissionDenied => StatusCode::UNAUTHORIZED,
            AppError::InvalidPassword { .. }
            | AppError::LockedOut { .. }
            | AppError::IdentityExists
            | AppError::AccountNotFound(_)
            | AppError::ActionNotAllowed(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Store(_) | AppError::Internal(_) | AppError::Io(_) | AppError::Json(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }

    /// Get the stable machine-readable code for this error
    pub fn error_code(&self) -> u16 {
        match self {
            AppError::Store(_) | AppError::Internal(_) | AppError::Io(_) | AppError::Json(_) => 700,
            AppError::IdentityExists => 701,
            AppError::InvalidPassword { .. } => 702,
            AppError::MissingAuthHeader => 703,
            AppError::InvalidAuthScheme => 704,
            AppError::InvalidToken => 705,
            AppError::AccountNotFound(_) => 706,
            AppError::LockedOut { .. } => 707,
            AppError::ActionNotAllowed(_) => 708,
            AppError::PermissionDenied => 709,
            AppError::InvalidInput(_) => 710,
        }
    }

    /// Message safe to hand to a client. Internal failures are not echoed.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Store(_) | AppError::Internal(_) | AppError::Io(_) | AppError::Json(_) => {
                "an internal server error occurred".to_string()
            },
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::info!(
                status = status.as_u16(),
                error_code = self.error_code(),
                error = %self,
                "request rejected"
            );
        }

        let body = ApiResponse::<()>::error(self.public_message(), status.as_u16(), self.error_code());
        (status, axum::Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("background task failed: {err}"))
    }
}
