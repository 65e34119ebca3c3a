//! Authentication services.
//!
//! Client logins run through the lockout guard before any password
//! comparison; administrator logins are a plain credential check against the
//! separate `admin_user` table. Password hashing is Argon2id throughout.

mod error;
pub mod lockout;
pub mod setup_token;

pub use error::AuthError;
pub use lockout::{LockoutDenied, LockoutPolicy};
pub use setup_token::SingleUseSecret;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use sqlx::PgPool;

use crestline_core::{ClientId, Email};

use crate::config::SecurityConfig;
use crate::db::admins::AdminRepository;
use crate::db::clients::ClientRepository;
use crate::models::admin::AdminUser;
use crate::models::client::{AuthorizedAccount, ClientCredential};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Which presentation of the setup secret to issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKind {
    /// Long URL-safe token, delivered inside an emailed link.
    Token,
    /// Short numeric code, read out over the phone.
    Otp,
}

/// Client authentication service.
///
/// Handles lockout-guarded logins and the password-setup secret lifecycle.
pub struct AuthService<'a> {
    clients: ClientRepository<'a>,
    policy: LockoutPolicy,
    secret_ttl: Duration,
}

impl<'a> AuthService<'a> {
    /// Create a new client authentication service.
    #[must_use]
    pub fn new(pool: &'a PgPool, security: &SecurityConfig) -> Self {
        Self {
            clients: ClientRepository::new(pool),
            policy: LockoutPolicy {
                max_attempts: security.max_login_attempts,
                lock_duration: Duration::minutes(i64::from(security.lockout_minutes)),
            },
            secret_ttl: Duration::hours(security.setup_token_ttl_hours),
        }
    }

    /// Login with email and password.
    ///
    /// Resolves every account registered under the email; the password check
    /// and lockout counters bind to the primary (oldest) record, and the
    /// returned list covers all of them.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Locked` while the lockout window is open (no
    /// password comparison is performed, no attempt is consumed).
    /// Returns `AuthError::InvalidCredentials` for an unknown email, an
    /// absent credential, or a wrong password.
    pub async fn login_client(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Vec<AuthorizedAccount>, AuthError> {
        let email = Email::parse(email.trim().to_lowercase().as_str())?;

        let credentials = self.clients.get_by_email(&email).await?;
        let Some(primary) = credentials.first() else {
            return Err(AuthError::InvalidCredentials);
        };

        let now = Utc::now();
        self.policy
            .check(primary.locked_until, now)
            .map_err(|denied| AuthError::Locked {
                remaining_minutes: denied.remaining_minutes,
            })?;

        let Some(hash) = primary.password_hash.as_deref() else {
            // Nothing to compare against; no attempt is consumed.
            return Err(AuthError::InvalidCredentials);
        };

        if verify_password(password, hash).is_err() {
            return Err(self.register_failure(primary.id).await?);
        }

        self.clients.reset_attempts(primary.id).await?;

        Ok(credentials
            .iter()
            .map(ClientCredential::account)
            .collect())
    }

    /// Record a failed comparison and map the post-increment state to the
    /// outcome the caller reports.
    async fn register_failure(&self, id: ClientId) -> Result<AuthError, AuthError> {
        // Saturate on a pathologically large configured duration.
        let lock_minutes =
            i32::try_from(self.policy.lock_duration.num_minutes()).unwrap_or(i32::MAX);
        let (attempts, locked_until) = self
            .clients
            .record_failed_attempt(id, self.policy.max_attempts, lock_minutes)
            .await?;

        let now = Utc::now();
        if let Some(until) = locked_until
            && until > now
        {
            tracing::warn!(client_id = %id, attempts, "login lockout window opened");
            return Ok(AuthError::Locked {
                remaining_minutes: lockout::remaining_minutes(until, now),
            });
        }

        Ok(AuthError::InvalidCredentials)
    }

    /// Issue a fresh setup secret for a client, overwriting any prior one.
    ///
    /// Returns the credential (for the email address and greeting) together
    /// with the plaintext secret the caller delivers out-of-band. The secret
    /// is persisted before delivery is attempted, so a failed send never
    /// corrupts the stored state.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotFound` if the client doesn't exist or carries
    /// no email address (such records are excluded from onboarding).
    pub async fn issue_setup_secret(
        &self,
        client_id: ClientId,
        kind: SecretKind,
    ) -> Result<(ClientCredential, SingleUseSecret), AuthError> {
        let client = self
            .clients
            .get_by_id(client_id)
            .await?
            .ok_or(AuthError::NotFound)?;

        if client.email.is_none() {
            return Err(AuthError::NotFound);
        }

        let now = Utc::now();
        let secret = match kind {
            SecretKind::Token => SingleUseSecret::token(now, self.secret_ttl),
            SecretKind::Otp => SingleUseSecret::otp(now, self.secret_ttl),
        };

        self.clients
            .store_setup_secret(client_id, &secret.value, secret.expires_at)
            .await?;

        Ok((client, secret))
    }

    /// Validate a presented setup secret against an identity (email or
    /// client code).
    ///
    /// Read-only: repeated validation with the same value keeps succeeding
    /// until the secret is consumed by [`Self::complete_password_setup`].
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotFound` if no record matches both identity and
    /// value, `AuthError::Expired` if the match is past its validity window.
    pub async fn validate_setup_secret(
        &self,
        identity: &str,
        presented: &str,
    ) -> Result<ClientCredential, AuthError> {
        let client = self
            .clients
            .find_by_setup_secret(identity.trim(), presented.trim())
            .await?
            .ok_or(AuthError::NotFound)?;

        let expires = client.setup_secret_expires.ok_or(AuthError::NotFound)?;
        if Utc::now() > expires {
            return Err(AuthError::Expired);
        }

        Ok(client)
    }

    /// Commit a validated setup: hash and store the chosen password, consume
    /// the secret and close out onboarding.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password fails policy,
    /// `AuthError::NotFound` if the client vanished.
    pub async fn complete_password_setup(
        &self,
        client_id: ClientId,
        password: &str,
    ) -> Result<(), AuthError> {
        validate_password(password)?;
        let hash = hash_password(password)?;

        self.clients
            .complete_password_setup(client_id, &hash)
            .await
            .map_err(|e| match e {
                crate::db::RepositoryError::NotFound => AuthError::NotFound,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(client_id = %client_id, "client password setup completed");
        Ok(())
    }
}

/// Administrator authentication service.
pub struct AdminAuthService<'a> {
    admins: AdminRepository<'a>,
}

impl<'a> AdminAuthService<'a> {
    /// Create a new admin authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            admins: AdminRepository::new(pool),
        }
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown email or a
    /// wrong password; the two are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<AdminUser, AuthError> {
        let email = Email::parse(email.trim().to_lowercase().as_str())?;

        let admin = self
            .admins
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &admin.password_hash)?;

        Ok(admin)
    }
}

/// Validate password meets requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if the password is too short.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` on mismatch or an unparseable
/// stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same password").unwrap();
        let b = hash_password("same password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_validate_password_length() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
