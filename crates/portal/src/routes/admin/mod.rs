//! Administrative surface routes.
//!
//! Everything under `/admin` sits behind the route gate (cookie presence)
//! except the login and completion endpoints; handlers then validate the
//! session for real through `RequireAdminAuth`.

pub mod auth;
pub mod clients;

use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};

use crate::middleware::admin_gate;
use crate::state::AppState;

/// Create the admin router, gated on the admin session cookie.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/auth/login", get(auth::login_page).post(auth::login))
        .route("/admin/auth/complete", get(auth::complete))
        .route("/admin/auth/logout", post(auth::logout))
        .route("/admin/clients", get(clients::list))
        .route("/admin/clients/{id}/send-setup", post(clients::send_setup))
        .route("/admin/clients/{id}/send-code", post(clients::send_code))
        .layer(from_fn(admin_gate))
}
