//! Client record management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a client with the shared default credential
//! crestline-cli client create -c CL-10042 -n "Acme Holdings" -e ops@acme.example
//!
//! # Issue a password-setup token and print the link
//! crestline-cli client send-setup -c CL-10042
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `DEFAULT_CLIENT_PASSWORD` - Shared default credential assigned at
//!   creation (omit to create records with no credential at all)
//! - `PORTAL_BASE_URL` - Base URL for generated setup links
//! - `SETUP_TOKEN_TTL_HOURS` - Setup token lifetime (default: 24)

use chrono::{Duration, Utc};

use crestline_core::{ClientCode, Email};
use crestline_portal::db::{ClientRepository, RepositoryError};
use crestline_portal::services::auth::{SingleUseSecret, hash_password};

use super::{CliError, connect};

/// Create a new client record.
///
/// When `DEFAULT_CLIENT_PASSWORD` is set, its hash is assigned as the shared
/// default credential and the record starts in the `default_assigned` state;
/// otherwise the record has no credential (`unset`).
///
/// # Errors
///
/// Returns `CliError` on invalid input, a duplicate client code, or database
/// failure.
pub async fn create(code: &str, name: &str, email: Option<&str>) -> Result<(), CliError> {
    let code = ClientCode::parse(code).map_err(|e| CliError::InvalidClientCode(e.to_string()))?;
    let email = email
        .map(Email::parse)
        .transpose()
        .map_err(|e| CliError::InvalidEmail(e.to_string()))?;

    let pool = connect().await?;

    let default_hash = match std::env::var("DEFAULT_CLIENT_PASSWORD") {
        Ok(password) => Some(hash_password(&password)?),
        Err(_) => {
            tracing::warn!("DEFAULT_CLIENT_PASSWORD not set - creating record with no credential");
            None
        }
    };

    let repo = ClientRepository::new(&pool);
    let client = repo
        .create(&code, name, email.as_ref(), default_hash.as_deref())
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => CliError::AlreadyExists(code.to_string()),
            other => CliError::Repository(other),
        })?;

    tracing::info!(
        "Client created successfully! ID: {}, Code: {}, Credential: {}",
        client.id,
        client.client_code,
        client.password_state
    );
    if client.email.is_none() {
        tracing::warn!("No email on record; this client is excluded from onboarding flows");
    }

    Ok(())
}

/// Issue a password-setup token for a client and print the link.
///
/// Overwrites any previously issued token for the same client.
///
/// # Errors
///
/// Returns `CliError::NotFound` if the code matches no record with an email
/// address.
pub async fn send_setup(code: &str) -> Result<(), CliError> {
    let code = ClientCode::parse(code).map_err(|e| CliError::InvalidClientCode(e.to_string()))?;

    let pool = connect().await?;

    let base_url = std::env::var("PORTAL_BASE_URL").unwrap_or_else(|_| {
        tracing::warn!("PORTAL_BASE_URL not set, using default");
        "http://localhost:3000".to_owned()
    });
    let ttl_hours: i64 = std::env::var("SETUP_TOKEN_TTL_HOURS")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(24);

    let repo = ClientRepository::new(&pool);
    let client = repo
        .get_by_client_code(&code)
        .await?
        .ok_or_else(|| CliError::NotFound(format!("no client with code {code}")))?;

    if client.email.is_none() {
        return Err(CliError::NotFound(format!(
            "client {code} has no email address and is excluded from onboarding"
        )));
    }

    let secret = SingleUseSecret::token(Utc::now(), Duration::hours(ttl_hours));
    repo.store_setup_secret(client.id, &secret.value, secret.expires_at)
        .await?;

    let setup_link = format!(
        "{}/auth/setup?identity={}&token={}",
        base_url.trim_end_matches('/'),
        code,
        secret.value
    );

    tracing::info!("Setup token issued (valid {} hours)", ttl_hours);
    tracing::info!("Share this setup link with the client:");
    tracing::info!("  {}", setup_link);

    Ok(())
}
