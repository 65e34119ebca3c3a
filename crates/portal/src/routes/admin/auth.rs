//! Administrative authentication route handlers.
//!
//! Admin login is two-phase: a credential check buys a short-lived pending
//! ticket, the browser is redirected to the completion endpoint, and only
//! there is the real session committed and the cookie set. The split keeps
//! session materialization on the far side of the redirect boundary without
//! extending trust past the ticket's 60-second window.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, header::SET_COOKIE},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use crate::filters;
use crate::services::AdminAuthService;
use crate::session::cookie::{clear_session_cookie, extract_session_id, session_cookie};
use crate::state::AppState;

/// Default landing page after admin login.
const DEFAULT_NEXT: &str = "/admin/clients";

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct AdminLoginForm {
    pub email: String,
    pub password: String,
    pub next: Option<String>,
}

/// Query parameters for the login page.
#[derive(Debug, Deserialize)]
pub struct AdminLoginQuery {
    pub error: Option<String>,
    pub next: Option<String>,
}

/// Query parameters for the completion endpoint.
#[derive(Debug, Deserialize)]
pub struct CompleteQuery {
    pub ticket: Option<String>,
    pub next: Option<String>,
}

/// Admin login page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/login.html")]
pub struct AdminLoginTemplate {
    pub error: Option<String>,
    pub next: String,
}

/// Display the admin login page.
///
/// GET /admin/auth/login
pub async fn login_page(Query(query): Query<AdminLoginQuery>) -> impl IntoResponse {
    AdminLoginTemplate {
        error: error_message(query.error.as_deref()),
        next: sanitize_next(query.next.as_deref()),
    }
}

/// Handle the admin login form: verify credentials and hand out a pending
/// ticket for the completion redirect.
///
/// POST /admin/auth/login
pub async fn login(State(state): State<AppState>, Form(form): Form<AdminLoginForm>) -> Response {
    let next = sanitize_next(form.next.as_deref());

    let auth = AdminAuthService::new(state.pool());
    let admin = match auth.login(&form.email, &form.password).await {
        Ok(admin) => admin,
        Err(e) => {
            tracing::warn!("Admin login failed: {}", e);
            return Redirect::to(&format!(
                "/admin/auth/login?error=credentials&next={}",
                urlencoding::encode(&next)
            ))
            .into_response();
        }
    };

    let ticket = state.admin_sessions().begin_login(admin.session_ref()).await;

    Redirect::to(&format!(
        "/admin/auth/complete?ticket={}&next={}",
        urlencoding::encode(&ticket.id),
        urlencoding::encode(&next)
    ))
    .into_response()
}

/// Complete the two-phase login: consume the ticket, commit the session and
/// set the transport cookie.
///
/// GET /admin/auth/complete
pub async fn complete(State(state): State<AppState>, Query(query): Query<CompleteQuery>) -> Response {
    let next = sanitize_next(query.next.as_deref());

    let Some(ticket) = query.ticket else {
        return Redirect::to("/admin/auth/login?error=expired").into_response();
    };

    let session_id = match state.admin_sessions().complete_login(&ticket).await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("Admin login completion failed: {}", e);
            return Redirect::to("/admin/auth/login?error=expired").into_response();
        }
    };

    let max_age_secs = state.config().security.admin_session_hours * 60 * 60;
    let Ok(cookie) = session_cookie(&session_id, max_age_secs, state.config().is_secure()) else {
        return Redirect::to("/admin/auth/login?error=internal").into_response();
    };

    ([(SET_COOKIE, cookie)], Redirect::to(&next)).into_response()
}

/// Logout: revoke the server-held session and clear the cookie.
///
/// The cookie is cleared even if the session record was already gone.
///
/// POST /admin/auth/logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(session_id) = extract_session_id(&headers) {
        state.admin_sessions().revoke(&session_id).await;
    }

    match clear_session_cookie(state.config().is_secure()) {
        Ok(cookie) => {
            ([(SET_COOKIE, cookie)], Redirect::to("/admin/auth/login")).into_response()
        }
        Err(_) => Redirect::to("/admin/auth/login").into_response(),
    }
}

/// Keep the return target on-site; anything else falls back to the default.
fn sanitize_next(next: Option<&str>) -> String {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_owned(),
        _ => DEFAULT_NEXT.to_owned(),
    }
}

/// Map an error code from the query string to a user-facing message.
fn error_message(code: Option<&str>) -> Option<String> {
    match code? {
        "credentials" => Some("Invalid email or password.".to_owned()),
        "expired" => Some("Sign-in took too long. Please try again.".to_owned()),
        _ => Some("Something went wrong. Please try again.".to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_next_keeps_local_paths() {
        assert_eq!(sanitize_next(Some("/admin/clients")), "/admin/clients");
        assert_eq!(sanitize_next(Some("/admin/reports")), "/admin/reports");
    }

    #[test]
    fn test_sanitize_next_rejects_offsite_targets() {
        assert_eq!(sanitize_next(Some("https://evil.example")), DEFAULT_NEXT);
        assert_eq!(sanitize_next(Some("//evil.example")), DEFAULT_NEXT);
        assert_eq!(sanitize_next(None), DEFAULT_NEXT);
    }
}
