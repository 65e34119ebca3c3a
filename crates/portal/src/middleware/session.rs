//! Client session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. The client
//! session is the lightweight flag domain: it lives as long as the cookie
//! does (no server-tracked expiry) and holds only the authenticated account
//! list.

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::PortalConfig;

/// Session cookie name for clients.
pub const CLIENT_SESSION_COOKIE: &str = "client_session";

/// Create the session layer with `PostgreSQL` store.
///
/// # Arguments
///
/// * `pool` - `PostgreSQL` connection pool
/// * `config` - Portal configuration (for determining HTTPS mode)
///
/// # Panics
///
/// Panics if the schema or table name is invalid (never the case for the
/// hardcoded "public" and "session" values).
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &PortalConfig,
) -> SessionManagerLayer<PostgresStore> {
    // Note: The session table must be created via migration.
    let store = PostgresStore::new(pool.clone())
        .with_schema_name("public")
        .expect("valid schema name")
        .with_table_name("session")
        .expect("valid table name");

    SessionManagerLayer::new(store)
        .with_name(CLIENT_SESSION_COOKIE)
        // The cookie's own lifetime is the only expiry the flag session has.
        .with_expiry(Expiry::OnSessionEnd)
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
