//! Client credential model.
//!
//! One record per client identity. Password, lockout and setup-secret state
//! all live on this row; the onboarding stage shown to administrators is
//! derived from it (see `services::onboarding`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crestline_core::{ClientCode, ClientId, Email, OnboardingStatus, PasswordState};

/// A client credential record.
///
/// Contains the password hash -- never serialize this to responses directly.
#[derive(Debug, Clone)]
pub struct ClientCredential {
    /// Database ID.
    pub id: ClientId,
    /// External-facing account handle.
    pub client_code: ClientCode,
    /// Name used in greetings and the admin listing.
    pub display_name: String,
    /// Login/setup lookup key. Records without an email are excluded from
    /// onboarding flows.
    pub email: Option<Email>,
    /// Argon2id hash of the current credential, if any.
    pub password_hash: Option<String>,
    /// Whether the stored credential is unset, the shared default, or
    /// client-chosen.
    pub password_state: PasswordState,
    /// Consecutive failed login attempts since the last success.
    pub login_attempts: i32,
    /// When set and in the future, logins are rejected without a password
    /// comparison.
    pub locked_until: Option<DateTime<Utc>>,
    /// Single active password-setup secret (token or OTP presentation).
    pub setup_secret: Option<String>,
    /// Expiry of the setup secret. An expired secret is inert but is not
    /// eagerly deleted.
    pub setup_secret_expires: Option<DateTime<Utc>>,
    /// Stored onboarding stage (advisory, forward-only by convention).
    pub onboarding_status: OnboardingStatus,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl ClientCredential {
    /// Returns the setup secret if one exists and has not expired at `now`.
    ///
    /// Expired secrets are treated as absent (lazy expiry); callers must not
    /// delete them here.
    #[must_use]
    pub fn active_setup_secret(&self, now: DateTime<Utc>) -> Option<&str> {
        let secret = self.setup_secret.as_deref()?;
        let expires = self.setup_secret_expires?;
        if now > expires {
            return None;
        }
        Some(secret)
    }

    /// Returns true if the lockout window is open at `now`.
    #[must_use]
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| until > now)
    }

    /// The `{id, client_code}` pair a session acts on behalf of.
    #[must_use]
    pub fn account(&self) -> AuthorizedAccount {
        AuthorizedAccount {
            id: self.id,
            client_code: self.client_code.clone(),
        }
    }
}

/// An account a client session is entitled to act on behalf of.
///
/// One login (email) may map to several managed accounts; the session payload
/// carries the full list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizedAccount {
    /// Client's database ID.
    pub id: ClientId,
    /// Client's external-facing handle.
    pub client_code: ClientCode,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn credential() -> ClientCredential {
        let now = Utc::now();
        ClientCredential {
            id: ClientId::new(1),
            client_code: ClientCode::parse("CL-1").unwrap(),
            display_name: "Test Client".to_owned(),
            email: Some(Email::parse("client@example.com").unwrap()),
            password_hash: None,
            password_state: PasswordState::Unset,
            login_attempts: 0,
            locked_until: None,
            setup_secret: None,
            setup_secret_expires: None,
            onboarding_status: OnboardingStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_active_setup_secret_requires_both_fields() {
        let now = Utc::now();
        let mut cred = credential();
        assert!(cred.active_setup_secret(now).is_none());

        cred.setup_secret = Some("abc".to_owned());
        // No expiry recorded: treated as absent rather than eternal.
        assert!(cred.active_setup_secret(now).is_none());

        cred.setup_secret_expires = Some(now + Duration::hours(1));
        assert_eq!(cred.active_setup_secret(now), Some("abc"));
    }

    #[test]
    fn test_expired_setup_secret_is_inert() {
        let now = Utc::now();
        let mut cred = credential();
        cred.setup_secret = Some("abc".to_owned());
        cred.setup_secret_expires = Some(now - Duration::minutes(1));
        assert!(cred.active_setup_secret(now).is_none());
        // The stored value itself is untouched.
        assert_eq!(cred.setup_secret.as_deref(), Some("abc"));
    }

    #[test]
    fn test_is_locked_boundary() {
        let now = Utc::now();
        let mut cred = credential();
        assert!(!cred.is_locked(now));

        cred.locked_until = Some(now + Duration::minutes(10));
        assert!(cred.is_locked(now));

        cred.locked_until = Some(now - Duration::seconds(1));
        assert!(!cred.is_locked(now));
    }
}
