//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! crestline-cli admin create -e admin@example.com -n "Admin Name" -p <password>
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string

use crestline_core::Email;
use crestline_portal::db::{AdminRepository, RepositoryError};
use crestline_portal::services::auth::hash_password;

use super::{CliError, connect};

/// Create a new admin user.
///
/// # Arguments
///
/// * `email` - Admin's email address
/// * `name` - Admin's display name
/// * `password` - Initial password (hashed with Argon2id before storage)
///
/// # Errors
///
/// Returns `CliError::AlreadyExists` if an admin with this email exists.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<i32, CliError> {
    let email = Email::parse(email.trim().to_lowercase().as_str())
        .map_err(|e| CliError::InvalidEmail(e.to_string()))?;

    let pool = connect().await?;

    tracing::info!("Creating admin user: {}", email);

    let password_hash = hash_password(password)?;

    let repo = AdminRepository::new(&pool);
    let admin = repo
        .create(&email, name, &password_hash)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => CliError::AlreadyExists(email.to_string()),
            other => CliError::Repository(other),
        })?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        admin.id,
        admin.email
    );

    Ok(admin.id.as_i32())
}
