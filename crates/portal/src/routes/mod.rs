//! HTTP route handlers for the portal.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (verifies database)
//!
//! # Client auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action (lockout-guarded)
//! POST /auth/logout            - Logout action
//!
//! # Password setup
//! GET  /auth/setup             - Setup form behind the emailed token link
//! POST /auth/setup             - Complete setup via token
//! GET  /auth/setup/code        - Setup form for the OTP presentation
//! POST /auth/setup/code        - Complete setup via OTP
//!
//! # Account
//! GET  /                       - Landing redirect (account or login)
//! GET  /account                - Authorized account overview (requires auth)
//!
//! # Admin (cookie-gated; deep validation per handler)
//! GET  /admin/auth/login       - Admin login page
//! POST /admin/auth/login       - Credential check, issues a pending ticket
//! GET  /admin/auth/complete    - Consumes the ticket, commits the session
//! POST /admin/auth/logout      - Revoke session, clear cookie
//! GET  /admin/clients          - Onboarding listing (contract ordering)
//! POST /admin/clients/{id}/send-setup - Issue + email a setup link token
//! POST /admin/clients/{id}/send-code  - Issue + email a setup OTP code
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod setup;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the client auth routes router.
///
/// Login and setup endpoints carry the per-IP auth rate limiter on top of
/// the per-credential lockout.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(auth::login_page).post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/setup", get(setup::setup_page).post(setup::setup_submit))
        .route(
            "/auth/setup/code",
            get(setup::setup_code_page).post(setup::setup_code_submit),
        )
        .layer(auth_rate_limiter())
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::home))
        .route("/account", get(account::overview))
}

/// Create the complete application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(account_routes())
        .merge(admin::router())
}
