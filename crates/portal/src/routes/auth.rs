//! Client authentication route handlers.
//!
//! Handles client login and logout. Logins run through the lockout guard; a
//! locked account is told how long to wait, every other failure collapses to
//! one generic message.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::filters;
use crate::middleware::{clear_current_client, set_current_client};
use crate::models::CurrentClient;
use crate::services::AuthService;
use crate::services::auth::AuthError;
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub minutes: Option<i64>,
    pub success: Option<String>,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        error: error_message(query.error.as_deref(), query.minutes),
        success: success_message(query.success.as_deref()),
    }
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let auth = AuthService::new(state.pool(), &state.config().security);

    match auth.login_client(&form.email, &form.password).await {
        Ok(accounts) => {
            let current = CurrentClient { accounts };
            if let Err(e) = set_current_client(&session, &current).await {
                tracing::error!("Failed to set session: {}", e);
                return Redirect::to("/auth/login?error=session").into_response();
            }

            Redirect::to("/account").into_response()
        }
        Err(AuthError::Locked { remaining_minutes }) => {
            Redirect::to(&format!("/auth/login?error=locked&minutes={remaining_minutes}"))
                .into_response()
        }
        Err(AuthError::InvalidEmail(_) | AuthError::InvalidCredentials) => {
            Redirect::to("/auth/login?error=credentials").into_response()
        }
        Err(e) => {
            tracing::error!("Login failed: {}", e);
            Redirect::to("/auth/login?error=internal").into_response()
        }
    }
}

/// Logout and clear the client session.
pub async fn logout(session: Session) -> impl IntoResponse {
    let _ = clear_current_client(&session).await;

    Redirect::to("/auth/login")
}

/// Map an error code from the query string to a user-facing message.
fn error_message(code: Option<&str>, minutes: Option<i64>) -> Option<String> {
    match code? {
        "credentials" => Some("Invalid email or password.".to_owned()),
        "locked" => {
            let minutes = minutes.unwrap_or(1).max(1);
            Some(format!(
                "Account temporarily locked. Try again in {minutes} minute(s)."
            ))
        }
        "setup_invalid" => Some("That setup link is invalid or has expired.".to_owned()),
        "session" | "internal" => Some("Something went wrong. Please try again.".to_owned()),
        _ => Some("Login failed. Please try again.".to_owned()),
    }
}

/// Map a success code from the query string to a user-facing message.
fn success_message(code: Option<&str>) -> Option<String> {
    match code? {
        "password_set" => Some("Password saved. You can sign in now.".to_owned()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_none_without_code() {
        assert!(error_message(None, None).is_none());
    }

    #[test]
    fn test_locked_message_discloses_minutes() {
        let message = error_message(Some("locked"), Some(12)).unwrap();
        assert!(message.contains("12"));
    }

    #[test]
    fn test_locked_message_floors_at_one_minute() {
        let message = error_message(Some("locked"), Some(0)).unwrap();
        assert!(message.contains("1 minute"));
    }

    #[test]
    fn test_credentials_message_is_generic() {
        let message = error_message(Some("credentials"), None).unwrap();
        // Must not reveal whether the email or the password was wrong.
        assert!(!message.to_lowercase().contains("unknown"));
        assert!(!message.to_lowercase().contains("no account"));
    }

    #[test]
    fn test_success_message() {
        assert!(success_message(Some("password_set")).is_some());
        assert!(success_message(Some("bogus")).is_none());
        assert!(success_message(None).is_none());
    }
}
