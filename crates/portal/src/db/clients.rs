//! Client credential repository.
//!
//! All lockout-counter mutations are single `UPDATE` statements so that two
//! concurrent failed attempts can never observe the same pre-increment count;
//! there is no read-then-write window at this layer.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crestline_core::{ClientCode, ClientId, Email, OnboardingStatus, PasswordState};

use super::RepositoryError;
use crate::models::client::ClientCredential;

/// Internal row type for database queries.
#[derive(Debug, sqlx::FromRow)]
struct ClientRow {
    id: i32,
    client_code: String,
    display_name: String,
    email: Option<String>,
    password_hash: Option<String>,
    password_state: String,
    login_attempts: i32,
    locked_until: Option<DateTime<Utc>>,
    setup_secret: Option<String>,
    setup_secret_expires: Option<DateTime<Utc>>,
    onboarding_status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

const CLIENT_COLUMNS: &str = "id, client_code, display_name, email, password_hash, \
     password_state, login_attempts, locked_until, setup_secret, \
     setup_secret_expires, onboarding_status, created_at, updated_at";

impl TryFrom<ClientRow> for ClientCredential {
    type Error = RepositoryError;

    fn try_from(row: ClientRow) -> Result<Self, Self::Error> {
        let client_code = ClientCode::parse(&row.client_code).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid client code in database: {e}"))
        })?;

        let email = row
            .email
            .as_deref()
            .map(Email::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
            })?;

        let password_state: PasswordState = row.password_state.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid password state in database: {e}"))
        })?;

        let onboarding_status: OnboardingStatus = row.onboarding_status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid onboarding status in database: {e}"))
        })?;

        Ok(Self {
            id: ClientId::new(row.id),
            client_code,
            display_name: row.display_name,
            email,
            password_hash: row.password_hash,
            password_state,
            login_attempts: row.login_attempts,
            locked_until: row.locked_until,
            setup_secret: row.setup_secret,
            setup_secret_expires: row.setup_secret_expires,
            onboarding_status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for client credential database operations.
pub struct ClientRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ClientRepository<'a> {
    /// Create a new client repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get every client record registered under an email address, oldest
    /// first. The first record is the *primary credential*: it holds the
    /// password hash and lockout counters for this login identity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored field is invalid.
    pub async fn get_by_email(
        &self,
        email: &Email,
    ) -> Result<Vec<ClientCredential>, RepositoryError> {
        let rows = sqlx::query_as::<_, ClientRow>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM client WHERE email = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(email.as_str())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a client by their external-facing client code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored field is invalid.
    pub async fn get_by_client_code(
        &self,
        client_code: &ClientCode,
    ) -> Result<Option<ClientCredential>, RepositoryError> {
        let row = sqlx::query_as::<_, ClientRow>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM client WHERE client_code = $1"
        ))
        .bind(client_code.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a client by their database ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored field is invalid.
    pub async fn get_by_id(
        &self,
        id: ClientId,
    ) -> Result<Option<ClientCredential>, RepositoryError> {
        let row = sqlx::query_as::<_, ClientRow>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM client WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List all client records, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored field is invalid.
    pub async fn list_all(&self) -> Result<Vec<ClientCredential>, RepositoryError> {
        let rows = sqlx::query_as::<_, ClientRow>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM client ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Create a new client record.
    ///
    /// When `default_password_hash` is given the record starts in the
    /// `default_assigned` credential state, otherwise `unset`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the client code already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        client_code: &ClientCode,
        display_name: &str,
        email: Option<&Email>,
        default_password_hash: Option<&str>,
    ) -> Result<ClientCredential, RepositoryError> {
        let password_state = if default_password_hash.is_some() {
            PasswordState::DefaultAssigned
        } else {
            PasswordState::Unset
        };

        let row = sqlx::query_as::<_, ClientRow>(&format!(
            "INSERT INTO client (client_code, display_name, email, password_hash, password_state) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {CLIENT_COLUMNS}"
        ))
        .bind(client_code.as_str())
        .bind(display_name)
        .bind(email.map(Email::as_str))
        .bind(default_password_hash)
        .bind(password_state.to_string())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("client code already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }

    /// Record a failed login attempt and return the post-increment state.
    ///
    /// Increments the attempt counter and, when the new count reaches
    /// `max_attempts`, opens a lockout window of `lock_minutes`. The whole
    /// read-modify-write happens in one statement; concurrent failures each
    /// observe a distinct post-increment count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the client doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn record_failed_attempt(
        &self,
        id: ClientId,
        max_attempts: i32,
        lock_minutes: i32,
    ) -> Result<(i32, Option<DateTime<Utc>>), RepositoryError> {
        let row = sqlx::query_as::<_, (i32, Option<DateTime<Utc>>)>(
            "UPDATE client \
             SET login_attempts = login_attempts + 1, \
                 locked_until = CASE \
                     WHEN login_attempts + 1 >= $2 \
                         THEN NOW() + make_interval(mins => $3) \
                     ELSE locked_until \
                 END, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING login_attempts, locked_until",
        )
        .bind(id.as_i32())
        .bind(max_attempts)
        .bind(lock_minutes)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row)
    }

    /// Reset the attempt counter and clear any lockout after a verified
    /// successful authentication.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the client doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn reset_attempts(&self, id: ClientId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE client \
             SET login_attempts = 0, locked_until = NULL, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Store a new setup secret, overwriting any prior one (at most one valid
    /// secret per client at any time). A record still in the `pending` stage
    /// advances to `email_sent`; later stages are left alone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the client doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn store_setup_secret(
        &self,
        id: ClientId,
        secret: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE client \
             SET setup_secret = $2, \
                 setup_secret_expires = $3, \
                 onboarding_status = CASE \
                     WHEN onboarding_status = 'pending' THEN 'email_sent' \
                     ELSE onboarding_status \
                 END, \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id.as_i32())
        .bind(secret)
        .bind(expires_at)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Find the client matching both an identity (email or client code) and
    /// the exact presented secret.
    ///
    /// Read-only: expiry is judged by the caller so that a stale value maps
    /// to `Expired` rather than `NotFound`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored field is invalid.
    pub async fn find_by_setup_secret(
        &self,
        identity: &str,
        secret: &str,
    ) -> Result<Option<ClientCredential>, RepositoryError> {
        let row = sqlx::query_as::<_, ClientRow>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM client \
             WHERE (email = $1 OR client_code = $1) AND setup_secret = $2"
        ))
        .bind(identity)
        .bind(secret)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Commit a completed password setup: store the new hash, mark the
    /// credential client-chosen, consume the setup secret and close out
    /// onboarding. One statement, all-or-nothing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the client doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn complete_password_setup(
        &self,
        id: ClientId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE client \
             SET password_hash = $2, \
                 password_state = 'user_set', \
                 setup_secret = NULL, \
                 setup_secret_expires = NULL, \
                 onboarding_status = 'completed', \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id.as_i32())
        .bind(password_hash)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
