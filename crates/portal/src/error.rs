//! Unified error handling for the portal.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;

/// Application-level error type for the portal.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication or credential-lifecycle failure.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Portal request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(auth) => auth_status(auth),
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        };

        // Don't expose internal error details to clients, and collapse the
        // token-failure variants so callers cannot probe which half of a
        // compound check failed.
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Auth(auth) => auth_message(auth),
            Self::NotFound(_) => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// HTTP status for an authentication failure.
fn auth_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::Repository(_) | AuthError::PasswordHash => StatusCode::INTERNAL_SERVER_ERROR,
        AuthError::Locked { .. } => StatusCode::FORBIDDEN,
        AuthError::InvalidEmail(_) | AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
        AuthError::InvalidCredentials | AuthError::NotFound | AuthError::Expired => {
            StatusCode::UNAUTHORIZED
        }
    }
}

/// User-safe message for an authentication failure.
///
/// `NotFound` and `Expired` share one message; remaining lock time is the
/// deliberate disclosure.
fn auth_message(err: &AuthError) -> String {
    match err {
        AuthError::Repository(_) | AuthError::PasswordHash => "Internal server error".to_string(),
        AuthError::Locked { remaining_minutes } => {
            format!("Account locked. Try again in {remaining_minutes} minute(s).")
        }
        AuthError::WeakPassword(reason) => reason.clone(),
        AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
        AuthError::InvalidCredentials => "Invalid email or password".to_string(),
        AuthError::NotFound | AuthError::Expired => "Invalid or expired setup link".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("client-123".to_string());
        assert_eq!(err.to_string(), "Not found: client-123");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            let response = err.into_response();
            response.status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::Locked {
                remaining_minutes: 5
            })),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::Expired)),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_token_failures_share_one_message() {
        // NotFound and Expired must be indistinguishable externally.
        assert_eq!(
            auth_message(&AuthError::NotFound),
            auth_message(&AuthError::Expired)
        );
    }

    #[test]
    fn test_lockout_discloses_remaining_minutes() {
        let message = auth_message(&AuthError::Locked {
            remaining_minutes: 10,
        });
        assert!(message.contains("10"));
    }
}
