//! CLI command implementations.

pub mod admin;
pub mod clients;
pub mod migrate;

use thiserror::Error;

/// Errors shared by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Repository error from the portal library.
    #[error("Repository error: {0}")]
    Repository(#[from] crestline_portal::db::RepositoryError),

    /// Credential error from the portal library.
    #[error("Auth error: {0}")]
    Auth(#[from] crestline_portal::services::auth::AuthError),

    /// Invalid email address.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Invalid client code.
    #[error("Invalid client code: {0}")]
    InvalidClientCode(String),

    /// Record already exists.
    #[error("Record already exists: {0}")]
    AlreadyExists(String),

    /// Record not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Connect to the database named by `DATABASE_URL`.
pub(crate) async fn connect() -> Result<sqlx::PgPool, CliError> {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| CliError::MissingEnvVar("DATABASE_URL"))?;

    sqlx::PgPool::connect(&database_url)
        .await
        .map_err(CliError::Database)
}
