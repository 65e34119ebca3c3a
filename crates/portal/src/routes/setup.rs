//! Password-setup route handlers.
//!
//! Two presentations of the same single-use secret: the emailed link carries
//! the long token in its query string, and the code form accepts the short
//! OTP a client was given out-of-band. Validation is read-only and can be
//! retried; only a successful submission consumes the secret.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::filters;
use crate::services::AuthService;
use crate::services::auth::AuthError;
use crate::state::AppState;

/// Query parameters carried by the emailed setup link.
#[derive(Debug, Deserialize)]
pub struct SetupLinkQuery {
    pub identity: Option<String>,
    pub token: Option<String>,
    pub error: Option<String>,
}

/// Form data for completing setup via the emailed link.
#[derive(Debug, Deserialize)]
pub struct SetupForm {
    pub identity: String,
    pub token: String,
    pub password: String,
    pub password_confirm: String,
}

/// Query parameters for the code entry page.
#[derive(Debug, Deserialize)]
pub struct SetupCodeQuery {
    pub error: Option<String>,
}

/// Form data for completing setup via an OTP code.
#[derive(Debug, Deserialize)]
pub struct SetupCodeForm {
    pub identity: String,
    pub code: String,
    pub password: String,
    pub password_confirm: String,
}

/// Setup page template (link presentation).
#[derive(Template, WebTemplate)]
#[template(path = "auth/setup.html")]
pub struct SetupTemplate {
    pub identity: String,
    pub token: String,
    pub display_name: String,
    pub error: Option<String>,
}

/// Code entry page template (OTP presentation).
#[derive(Template, WebTemplate)]
#[template(path = "auth/setup_code.html")]
pub struct SetupCodeTemplate {
    pub error: Option<String>,
}

/// Display the password form behind an emailed setup link.
///
/// The token is validated before the form is shown, so a dead link fails
/// here rather than after the client has typed a password.
pub async fn setup_page(
    State(state): State<AppState>,
    Query(query): Query<SetupLinkQuery>,
) -> Response {
    let (Some(identity), Some(token)) = (query.identity, query.token) else {
        return Redirect::to("/auth/login?error=setup_invalid").into_response();
    };

    let auth = AuthService::new(state.pool(), &state.config().security);
    match auth.validate_setup_secret(&identity, &token).await {
        Ok(client) => SetupTemplate {
            identity,
            token,
            display_name: client.display_name,
            error: form_error(query.error.as_deref()),
        }
        .into_response(),
        Err(AuthError::NotFound | AuthError::Expired) => {
            Redirect::to("/auth/login?error=setup_invalid").into_response()
        }
        Err(e) => {
            tracing::error!("Setup link validation failed: {}", e);
            Redirect::to("/auth/login?error=internal").into_response()
        }
    }
}

/// Handle the password form behind an emailed setup link.
pub async fn setup_submit(
    State(state): State<AppState>,
    Form(form): Form<SetupForm>,
) -> Response {
    complete_setup(
        &state,
        &form.identity,
        &form.token,
        &form.password,
        &form.password_confirm,
        &back_to_link(&form.identity, &form.token),
        "/auth/login?error=setup_invalid",
    )
    .await
}

/// Display the code entry page.
pub async fn setup_code_page(Query(query): Query<SetupCodeQuery>) -> impl IntoResponse {
    SetupCodeTemplate {
        error: form_error(query.error.as_deref()),
    }
}

/// Handle the code entry form.
pub async fn setup_code_submit(
    State(state): State<AppState>,
    Form(form): Form<SetupCodeForm>,
) -> Response {
    complete_setup(
        &state,
        &form.identity,
        &form.code,
        &form.password,
        &form.password_confirm,
        "/auth/setup/code",
        "/auth/setup/code?error=code_invalid",
    )
    .await
}

/// Shared completion path for both secret presentations.
///
/// Re-validates the secret, checks the chosen password, then commits. The
/// secret is consumed only by the commit.
#[allow(clippy::too_many_arguments)]
async fn complete_setup(
    state: &AppState,
    identity: &str,
    secret: &str,
    password: &str,
    password_confirm: &str,
    back: &str,
    on_invalid: &str,
) -> Response {
    let auth = AuthService::new(state.pool(), &state.config().security);

    let client = match auth.validate_setup_secret(identity, secret).await {
        Ok(client) => client,
        Err(AuthError::NotFound | AuthError::Expired) => {
            return Redirect::to(on_invalid).into_response();
        }
        Err(e) => {
            tracing::error!("Setup validation failed: {}", e);
            return Redirect::to("/auth/login?error=internal").into_response();
        }
    };

    if password != password_confirm {
        return redirect_with_error(back, "mismatch");
    }

    match auth.complete_password_setup(client.id, password).await {
        Ok(()) => Redirect::to("/auth/login?success=password_set").into_response(),
        Err(AuthError::WeakPassword(_)) => redirect_with_error(back, "weak"),
        Err(e) => {
            tracing::error!("Password setup failed: {}", e);
            Redirect::to("/auth/login?error=internal").into_response()
        }
    }
}

/// Link back to the token form with the secret preserved.
fn back_to_link(identity: &str, token: &str) -> String {
    format!(
        "/auth/setup?identity={}&token={}",
        urlencoding::encode(identity),
        urlencoding::encode(token)
    )
}

fn redirect_with_error(back: &str, code: &str) -> Response {
    let separator = if back.contains('?') { '&' } else { '?' };
    Redirect::to(&format!("{back}{separator}error={code}")).into_response()
}

/// Map an error code from the query string to a user-facing message.
fn form_error(code: Option<&str>) -> Option<String> {
    match code? {
        "mismatch" => Some("The passwords do not match.".to_owned()),
        "weak" => Some("Password must be at least 8 characters.".to_owned()),
        "code_invalid" => Some("That code is invalid or has expired.".to_owned()),
        _ => Some("Something went wrong. Please try again.".to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_back_to_link_encodes_components() {
        let link = back_to_link("client@example.com", "a+b/c");
        assert_eq!(link, "/auth/setup?identity=client%40example.com&token=a%2Bb%2Fc");
    }

    #[test]
    fn test_form_error_mapping() {
        assert!(form_error(Some("mismatch")).unwrap().contains("match"));
        assert!(form_error(Some("weak")).unwrap().contains("8"));
        assert!(form_error(None).is_none());
    }
}
