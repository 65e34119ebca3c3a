//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! crestline-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string
//!
//! Migration files live in `crates/portal/migrations/` and are embedded into
//! this binary at compile time.

use super::{CliError, connect};

/// Run portal database migrations.
///
/// # Errors
///
/// Returns `CliError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Running portal migrations...");
    sqlx::migrate!("../portal/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
