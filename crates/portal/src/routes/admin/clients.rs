//! Administrative client listing and onboarding actions.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};

use crestline_core::ClientId;

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::services::auth::SecretKind;
use crate::services::onboarding::{derive_status, listing_order};
use crate::services::AuthService;
use crate::state::AppState;

/// One row of the client listing.
pub struct ClientListRow {
    pub id: i32,
    pub client_code: String,
    pub display_name: String,
    pub email: Option<String>,
    pub status: String,
    pub locked: bool,
    pub created_at: DateTime<Utc>,
}

/// Client listing template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/clients.html")]
pub struct ClientsTemplate {
    pub admin_name: String,
    pub clients: Vec<ClientListRow>,
}

/// Display all clients with their derived onboarding status.
///
/// Ordering is part of the administrative contract: pending first, then
/// email sent, then completed, each group newest first.
///
/// GET /admin/clients
pub async fn list(
    RequireAdminAuth(session): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let repo = crate::db::ClientRepository::new(state.pool());
    let credentials = repo.list_all().await?;

    let now = Utc::now();
    let mut annotated: Vec<_> = credentials
        .into_iter()
        .map(|credential| {
            let status = derive_status(&credential, now);
            (status, credential)
        })
        .collect();

    annotated.sort_by(|a, b| {
        listing_order((Some(a.0), a.1.created_at), (Some(b.0), b.1.created_at))
    });

    let clients = annotated
        .into_iter()
        .map(|(status, credential)| ClientListRow {
            id: credential.id.as_i32(),
            client_code: credential.client_code.to_string(),
            display_name: credential.display_name.clone(),
            email: credential.email.as_ref().map(ToString::to_string),
            status: status.to_string(),
            locked: credential.is_locked(now),
            created_at: credential.created_at,
        })
        .collect();

    Ok(ClientsTemplate {
        admin_name: session.user.display_name,
        clients,
    }
    .into_response())
}

/// Issue a fresh setup token for a client and deliver the link by email.
///
/// The secret is persisted before the send is attempted; a delivery failure
/// leaves it valid for a resend.
///
/// POST /admin/clients/{id}/send-setup
pub async fn send_setup(
    RequireAdminAuth(_session): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let auth = AuthService::new(state.pool(), &state.config().security);
    let (client, secret) = auth
        .issue_setup_secret(ClientId::new(id), SecretKind::Token)
        .await?;

    let Some(email) = client.email.as_ref() else {
        // issue_setup_secret already refuses these records.
        return Err(AppError::NotFound("client has no email".to_owned()));
    };

    let setup_link = format!(
        "{}/auth/setup?identity={}&token={}",
        state.config().base_url.trim_end_matches('/'),
        urlencoding::encode(client.client_code.as_str()),
        urlencoding::encode(&secret.value)
    );

    if let Some(email_service) = state.email_service() {
        if let Err(e) = email_service
            .send_setup_email(email.as_str(), &client.display_name, &setup_link)
            .await
        {
            // The token stays valid; the admin can resend.
            tracing::error!(error = %e, client_id = %client.id, "Failed to send setup email");
            return Err(AppError::Internal("failed to send setup email".to_owned()));
        }
    } else {
        // Development mode - log the link
        tracing::warn!(
            client_code = %client.client_code,
            setup_link = %setup_link,
            "SMTP not configured - setup link logged (dev mode)"
        );
    }

    tracing::info!(client_id = %client.id, "setup email issued");

    Ok(Redirect::to("/admin/clients").into_response())
}

/// Issue a fresh setup code (the OTP presentation of the same secret) and
/// deliver it by email.
///
/// Overwrites any previously issued link token for the client; the two
/// presentations share one slot.
///
/// POST /admin/clients/{id}/send-code
pub async fn send_code(
    RequireAdminAuth(_session): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let auth = AuthService::new(state.pool(), &state.config().security);
    let (client, secret) = auth
        .issue_setup_secret(ClientId::new(id), SecretKind::Otp)
        .await?;

    let Some(email) = client.email.as_ref() else {
        return Err(AppError::NotFound("client has no email".to_owned()));
    };

    if let Some(email_service) = state.email_service() {
        if let Err(e) = email_service
            .send_setup_code(email.as_str(), &client.display_name, &secret.value)
            .await
        {
            tracing::error!(error = %e, client_id = %client.id, "Failed to send setup code");
            return Err(AppError::Internal("failed to send setup code".to_owned()));
        }
    } else {
        // Development mode - log the code
        tracing::warn!(
            client_code = %client.client_code,
            code = %secret.value,
            "SMTP not configured - setup code logged (dev mode)"
        );
    }

    tracing::info!(client_id = %client.id, "setup code issued");

    Ok(Redirect::to("/admin/clients").into_response())
}
