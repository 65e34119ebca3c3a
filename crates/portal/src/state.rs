//! Application state shared across handlers.

use std::sync::Arc;

use chrono::Duration;
use sqlx::PgPool;

use crate::config::PortalConfig;
use crate::services::EmailService;
use crate::session::AdminSessionStore;

/// Application state shared across all handlers.
///
/// Cheap to clone; the inner data is reference-counted.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: PortalConfig,
    pool: PgPool,
    admin_sessions: AdminSessionStore,
    email: Option<EmailService>,
}

impl AppState {
    /// Build the application state.
    ///
    /// When SMTP is unconfigured the email service is absent and setup
    /// links/codes are logged instead of delivered (dev mode).
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP relay cannot be configured.
    pub fn new(
        config: PortalConfig,
        pool: PgPool,
    ) -> Result<Self, lettre::transport::smtp::Error> {
        let email = config.email.as_ref().map(EmailService::new).transpose()?;

        let admin_sessions =
            AdminSessionStore::new(Duration::hours(config.security.admin_session_hours));

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                admin_sessions,
                email,
            }),
        })
    }

    /// The loaded configuration.
    #[must_use]
    pub fn config(&self) -> &PortalConfig {
        &self.inner.config
    }

    /// The database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// The server-held admin session store.
    #[must_use]
    pub fn admin_sessions(&self) -> &AdminSessionStore {
        &self.inner.admin_sessions
    }

    /// The email service, if SMTP is configured.
    #[must_use]
    pub fn email_service(&self) -> Option<&EmailService> {
        self.inner.email.as_ref()
    }
}
