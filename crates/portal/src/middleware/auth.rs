//! Authentication middleware and extractors.
//!
//! The session context is resolved once per request by these extractors and
//! handed to handlers; nothing reads authentication state ad hoc.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentClient, session_keys};
use crate::session::cookie::extract_session_id;
use crate::session::{AdminSession, SessionError};
use crate::state::AppState;

/// Extractor that requires client authentication.
///
/// If the client is not logged in, returns a redirect to the login page
/// for HTML requests, or 401 Unauthorized for API requests.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireClientAuth(client): RequireClientAuth,
/// ) -> impl IntoResponse {
///     format!("{} account(s)", client.accounts.len())
/// }
/// ```
pub struct RequireClientAuth(pub CurrentClient);

/// Error returned when client authentication is required but absent.
pub enum ClientAuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for ClientAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireClientAuth
where
    S: Send + Sync,
{
    type Rejection = ClientAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(ClientAuthRejection::Unauthorized)?;

        // Presence of the payload is the authenticated flag.
        let client: CurrentClient = session
            .get(session_keys::CURRENT_CLIENT)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| {
                let is_api = parts.uri.path().starts_with("/api/");
                if is_api {
                    ClientAuthRejection::Unauthorized
                } else {
                    ClientAuthRejection::RedirectToLogin
                }
            })?;

        Ok(Self(client))
    }
}

/// Extractor that optionally gets the current client.
///
/// Unlike `RequireClientAuth`, this does not reject the request if the client
/// is not logged in.
pub struct OptionalClientAuth(pub Option<CurrentClient>);

impl<S> FromRequestParts<S> for OptionalClientAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let client = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentClient>(session_keys::CURRENT_CLIENT)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(client))
    }
}

/// Extractor that requires a valid admin session.
///
/// The route gate only checks cookie *presence*; this extractor performs the
/// deep validation against the server-held store (and thereby evicts expired
/// entries on read).
pub struct RequireAdminAuth(pub AdminSession);

/// Error returned when admin authentication is required.
pub enum AdminAuthRejection {
    /// Redirect to the admin login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/admin/auth/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAdminAuth {
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let is_api = parts.uri.path().starts_with("/admin/api/");
        let reject = || {
            if is_api {
                AdminAuthRejection::Unauthorized
            } else {
                AdminAuthRejection::RedirectToLogin
            }
        };

        let session_id = extract_session_id(&parts.headers).ok_or_else(reject)?;

        // Expired and unknown sessions are indistinguishable to the caller.
        let session = state
            .admin_sessions()
            .validate(&session_id)
            .await
            .map_err(|e| {
                if e == SessionError::Expired {
                    tracing::debug!("admin session expired on read");
                }
                reject()
            })?;

        Ok(Self(session))
    }
}

/// Helper to set the current client in the session.
///
/// Cycles the session id so a pre-login session cannot be fixated.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_client(
    session: &Session,
    client: &CurrentClient,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_CLIENT, client).await
}

/// Helper to clear the current client from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_client(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
