//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.
//!
//! Soft-fail conditions (expired access token, unknown session during
//! renewal) are handled inside the middleware and never reach
//! `IntoResponse`; everything here is a hard failure for the request.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::password::{PasswordHashError, PasswordPolicyError};
use platform::token::TokenError;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong email or wrong password (indistinguishable on purpose)
    #[error("Wrong email or password.")]
    InvalidCredentials,

    #[error("An account with this email already exists.")]
    EmailTaken,

    #[error("{0}")]
    PasswordPolicy(#[from] PasswordPolicyError),

    /// Session record absent or expired
    #[error("Session not found or expired")]
    SessionNotFound,

    /// No usable credential for an endpoint that needs one
    #[error("Action requires authorization")]
    Unauthorized,

    /// Access token failed verification for a reason other than expiry
    #[error("Access token could not be verified: {0}")]
    TamperedToken(TokenError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Session store did not respond in time")]
    StoreTimeout,

    #[error("Session store error: {0}")]
    SessionStore(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] PasswordHashError),

    /// Validation failures already expressed as `AppError` (e.g. email)
    #[error("{0}")]
    App(AppError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials
            | AuthError::SessionNotFound
            | AuthError::Unauthorized => ErrorKind::Unauthorized,
            AuthError::EmailTaken => ErrorKind::Conflict,
            AuthError::PasswordPolicy(_) => ErrorKind::BadRequest,
            AuthError::StoreTimeout | AuthError::Database(sqlx::Error::PoolTimedOut) => {
                ErrorKind::ServiceUnavailable
            }
            AuthError::App(err) => err.kind(),
            AuthError::TamperedToken(_)
            | AuthError::Token(_)
            | AuthError::SessionStore(_)
            | AuthError::Database(_)
            | AuthError::PasswordHash(_)
            | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    ///
    /// Storage failures keep their underlying message in the response body.
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::App(err) => {
                let converted = AppError::new(err.kind(), err.message().to_string());
                match err.action() {
                    Some(action) => converted.with_action(action.to_string()),
                    None => converted,
                }
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::SessionStore(msg) => {
                tracing::error!(message = %msg, "Session store error");
            }
            AuthError::StoreTimeout => {
                tracing::error!("Session store timed out");
            }
            AuthError::TamperedToken(e) => {
                tracing::warn!(error = %e, "Rejected tampered access token");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::Internal(_) | AuthError::Token(_) | AuthError::PasswordHash(_) => {
                tracing::error!(error = %self, "Auth internal error");
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
        AuthError::App(err)
    }
}

impl From<redis::RedisError> for AuthError {
    fn from(err: redis::RedisError) -> Self {
        AuthError::SessionStore(err.to_string())
    }
}
