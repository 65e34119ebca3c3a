//! Account lockout state machine.
//!
//! Pure decision logic: the policy answers "may this login proceed" and
//! "does this failure count open a lockout window" from values the caller
//! already holds. Counter persistence is a single atomic statement in
//! `ClientRepository::record_failed_attempt`, so two concurrent failures can
//! never both observe a pre-increment count.

use chrono::{DateTime, Duration, Utc};

/// Configured lockout thresholds. Constructed from `SecurityConfig`; the
/// numbers are never hard-coded at call sites.
#[derive(Debug, Clone, Copy)]
pub struct LockoutPolicy {
    /// Consecutive failures that open a lockout window.
    pub max_attempts: i32,
    /// Length of the lockout window.
    pub lock_duration: Duration,
}

/// A login rejected because the lockout window is still open.
///
/// The remaining time is deliberately disclosed to the caller (and the user):
/// a minor information leak traded for usability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutDenied {
    /// When the window closes.
    pub locked_until: DateTime<Utc>,
    /// Whole minutes until then, ceiling-rounded, at least 1.
    pub remaining_minutes: i64,
}

impl LockoutPolicy {
    /// Gate applied before any password comparison.
    ///
    /// A record whose `locked_until` is in the future is rejected without
    /// consuming an attempt and without touching the password hash.
    ///
    /// # Errors
    ///
    /// Returns [`LockoutDenied`] with the remaining lock duration while the
    /// window is open.
    pub fn check(
        &self,
        locked_until: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<(), LockoutDenied> {
        match locked_until {
            Some(until) if until > now => Err(LockoutDenied {
                locked_until: until,
                remaining_minutes: remaining_minutes(until, now),
            }),
            _ => Ok(()),
        }
    }

    /// Whether a post-increment failure count opens the lockout window.
    #[must_use]
    pub const fn locks_after(&self, attempts: i32) -> bool {
        attempts >= self.max_attempts
    }

    /// The lock expiry for a window opened at `now`.
    #[must_use]
    pub fn lock_until(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.lock_duration
    }
}

/// Whole minutes from `now` until `until`, ceiling-rounded.
///
/// A window with one second left still reports one minute; a window already
/// closed reports zero.
#[must_use]
pub fn remaining_minutes(until: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let seconds = (until - now).num_seconds();
    if seconds <= 0 {
        return 0;
    }
    // `i64::div_ceil` is still unstable; `seconds` is guaranteed > 0 here, so
    // the cast to `u64` is lossless and `u64::div_ceil` is stable.
    (seconds as u64).div_ceil(60) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> LockoutPolicy {
        LockoutPolicy {
            max_attempts: 15,
            lock_duration: Duration::minutes(30),
        }
    }

    #[test]
    fn test_check_allows_unlocked() {
        let now = Utc::now();
        assert!(policy().check(None, now).is_ok());
    }

    #[test]
    fn test_check_allows_expired_lock() {
        let now = Utc::now();
        let until = now - Duration::seconds(1);
        assert!(policy().check(Some(until), now).is_ok());
    }

    #[test]
    fn test_check_rejects_open_window() {
        let now = Utc::now();
        let until = now + Duration::minutes(10);
        let denied = policy().check(Some(until), now).unwrap_err();
        assert_eq!(denied.locked_until, until);
        assert_eq!(denied.remaining_minutes, 10);
    }

    #[test]
    fn test_remaining_minutes_rounds_up() {
        let now = Utc::now();
        assert_eq!(remaining_minutes(now + Duration::seconds(61), now), 2);
        assert_eq!(remaining_minutes(now + Duration::seconds(60), now), 1);
        assert_eq!(remaining_minutes(now + Duration::seconds(1), now), 1);
        assert_eq!(remaining_minutes(now, now), 0);
        assert_eq!(remaining_minutes(now - Duration::seconds(30), now), 0);
    }

    #[test]
    fn test_locks_after_threshold() {
        let policy = policy();
        assert!(!policy.locks_after(14));
        assert!(policy.locks_after(15));
        assert!(policy.locks_after(16));
    }

    #[test]
    fn test_lock_until_uses_configured_duration() {
        let now = Utc::now();
        assert_eq!(policy().lock_until(now), now + Duration::minutes(30));
    }

    #[test]
    fn test_fourteen_failures_then_one_more_locks() {
        // Mirrors the repository CASE expression: the 15th failure (count
        // moving 14 -> 15) opens the window.
        let policy = policy();
        let post_increment = 14 + 1;
        assert!(policy.locks_after(post_increment));

        let now = Utc::now();
        let until = policy.lock_until(now);
        let denied = policy.check(Some(until), now).unwrap_err();
        assert_eq!(denied.remaining_minutes, 30);
    }
}
