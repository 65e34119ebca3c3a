//! Password-setup secrets.
//!
//! One abstraction with two presentations: the long URL-safe token embedded
//! in an emailed setup link, and the short numeric code read out to a client
//! over the phone. Both occupy the same storage slot on the client record and
//! share the same expiry rule; issuing a new secret of either kind overwrites
//! the previous one.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

/// Random bytes behind a link token (43 base64url characters).
const TOKEN_BYTES: usize = 32;

/// A single-use, time-limited secret bound to one client record.
///
/// Comparing and expiry-checking a secret never mutates anything; consuming
/// it (clearing the slot, storing the new password) is a separate explicit
/// repository call, so verification can be retried safely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleUseSecret {
    /// The stored/presented value.
    pub value: String,
    /// Strict expiry: the secret is valid through this instant and inert
    /// afterwards.
    pub expires_at: DateTime<Utc>,
}

impl SingleUseSecret {
    /// A link-token presentation: 32 bytes from the OS CSPRNG, base64url
    /// without padding. Collisions are treated as negligible and not checked.
    #[must_use]
    pub fn token(now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            value: generate_token(),
            expires_at: now + ttl,
        }
    }

    /// An OTP presentation: a 6-digit numeric code for out-of-band readout.
    #[must_use]
    pub fn otp(now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            value: generate_otp_code(),
            expires_at: now + ttl,
        }
    }

    /// Exact-match comparison against a presented value.
    #[must_use]
    pub fn matches(&self, presented: &str) -> bool {
        self.value == presented
    }

    /// Strictly after `expires_at`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Generate a link token from a cryptographically secure random source.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; TOKEN_BYTES] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generate a 6-digit setup code.
#[must_use]
pub fn generate_otp_code() -> String {
    let code: u32 = rand::rng().random_range(100_000..1_000_000);
    code.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_format() {
        let token = generate_token();
        // 32 bytes -> 43 chars of unpadded base64url
        assert_eq!(token.len(), 43);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_generate_token_unique() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn test_generate_otp_code_format() {
        let code = generate_otp_code();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_generate_otp_code_range() {
        for _ in 0..100 {
            let code: u32 = generate_otp_code().parse().expect("valid number");
            assert!(code >= 100_000);
            assert!(code < 1_000_000);
        }
    }

    #[test]
    fn test_expiry_is_strict() {
        let issued = Utc::now();
        let secret = SingleUseSecret::token(issued, Duration::hours(24));

        // Valid one minute before the deadline.
        assert!(!secret.is_expired(issued + Duration::hours(23) + Duration::minutes(59)));
        // Valid exactly at the deadline.
        assert!(!secret.is_expired(secret.expires_at));
        // Expired one minute past it.
        assert!(secret.is_expired(issued + Duration::hours(24) + Duration::minutes(1)));
    }

    #[test]
    fn test_matches_is_exact() {
        let secret = SingleUseSecret {
            value: "123456".to_owned(),
            expires_at: Utc::now(),
        };
        assert!(secret.matches("123456"));
        assert!(!secret.matches("123457"));
        assert!(!secret.matches(" 123456"));
    }

    #[test]
    fn test_matches_is_repeatable() {
        // Validation does not consume the secret; the same value keeps
        // matching until the caller explicitly clears the slot.
        let secret = SingleUseSecret::otp(Utc::now(), Duration::hours(24));
        let presented = secret.value.clone();
        assert!(secret.matches(&presented));
        assert!(secret.matches(&presented));
    }

    #[test]
    fn test_reissue_replaces_prior_value() {
        // The storage slot holds one secret; after a re-issue the old value
        // can no longer match what is stored.
        let now = Utc::now();
        let old = SingleUseSecret::token(now, Duration::hours(24));
        let new = SingleUseSecret::token(now, Duration::hours(24));
        assert!(!new.matches(&old.value));
    }

    #[test]
    fn test_otp_and_token_share_expiry_rule() {
        let now = Utc::now();
        let token = SingleUseSecret::token(now, Duration::hours(24));
        let otp = SingleUseSecret::otp(now, Duration::hours(24));
        assert_eq!(token.expires_at, otp.expires_at);
    }
}
