//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication and credential setup.
///
/// Handlers collapse `NotFound` and `Expired` into one user-facing message
/// ("invalid or expired") so a caller cannot probe which half of a compound
/// check failed. `Locked` is the deliberate exception: it discloses the
/// remaining lock time.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The email address is malformed.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] crestline_core::EmailError),

    /// Unknown identity or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The lockout window is open; no password comparison was performed.
    #[error("account locked for {remaining_minutes} more minute(s)")]
    Locked {
        /// Whole minutes until the window closes, ceiling-rounded.
        remaining_minutes: i64,
    },

    /// No record matches the identity/secret pair.
    #[error("not found")]
    NotFound,

    /// The secret matched but its validity window has passed.
    #[error("expired")]
    Expired,

    /// The chosen password does not meet requirements.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// Password hashing failed.
    #[error("failed to hash password")]
    PasswordHash,

    /// Underlying store failure.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}
