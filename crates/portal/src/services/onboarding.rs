//! Onboarding status derivation and listing order.
//!
//! Pure functions over the credential record; the tracker owns no state of
//! its own. The listing order is part of the observable administrative
//! contract and must stay exactly: pending, email sent, completed, unknown,
//! each group newest first.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crestline_core::OnboardingStatus;

use crate::models::client::ClientCredential;

/// Derive the onboarding stage shown to administrators.
///
/// - `Completed` requires both a client-chosen password and a stored status
///   of completed.
/// - `EmailSent` requires a live (non-expired) setup secret while the
///   password is still not client-chosen.
/// - Everything else is `Pending`.
#[must_use]
pub fn derive_status(credential: &ClientCredential, now: DateTime<Utc>) -> OnboardingStatus {
    if credential.password_state.is_user_set()
        && credential.onboarding_status == OnboardingStatus::Completed
    {
        return OnboardingStatus::Completed;
    }

    if credential.active_setup_secret(now).is_some() && !credential.password_state.is_user_set() {
        return OnboardingStatus::EmailSent;
    }

    OnboardingStatus::Pending
}

/// Group rank for the listing. `None` (an unrecognized stored status) sorts
/// after every known group.
#[must_use]
pub const fn sort_rank(status: Option<OnboardingStatus>) -> u8 {
    match status {
        Some(OnboardingStatus::Pending) => 0,
        Some(OnboardingStatus::EmailSent) => 1,
        Some(OnboardingStatus::Completed) => 2,
        None => 3,
    }
}

/// Comparator for the administrative listing: status groups in contract
/// order, then newest records first within each group.
#[must_use]
pub fn listing_order(
    a: (Option<OnboardingStatus>, DateTime<Utc>),
    b: (Option<OnboardingStatus>, DateTime<Utc>),
) -> Ordering {
    sort_rank(a.0)
        .cmp(&sort_rank(b.0))
        .then_with(|| b.1.cmp(&a.1))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crestline_core::{ClientCode, ClientId, PasswordState};

    fn credential(
        password_state: PasswordState,
        stored: OnboardingStatus,
        secret_expires_in: Option<Duration>,
    ) -> ClientCredential {
        let now = Utc::now();
        ClientCredential {
            id: ClientId::new(1),
            client_code: ClientCode::parse("CL-1").unwrap(),
            display_name: "Test".to_owned(),
            email: None,
            password_hash: None,
            password_state,
            login_attempts: 0,
            locked_until: None,
            setup_secret: secret_expires_in.map(|_| "secret".to_owned()),
            setup_secret_expires: secret_expires_in.map(|d| now + d),
            onboarding_status: stored,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_completed_requires_user_set_password_and_stored_status() {
        let now = Utc::now();
        let cred = credential(PasswordState::UserSet, OnboardingStatus::Completed, None);
        assert_eq!(derive_status(&cred, now), OnboardingStatus::Completed);

        // A client-chosen password alone is not enough.
        let cred = credential(PasswordState::UserSet, OnboardingStatus::EmailSent, None);
        assert_ne!(derive_status(&cred, now), OnboardingStatus::Completed);

        // Nor is a stored status with only the default credential.
        let cred = credential(
            PasswordState::DefaultAssigned,
            OnboardingStatus::Completed,
            None,
        );
        assert_eq!(derive_status(&cred, now), OnboardingStatus::Pending);
    }

    #[test]
    fn test_email_sent_requires_live_secret() {
        let now = Utc::now();
        let cred = credential(
            PasswordState::DefaultAssigned,
            OnboardingStatus::EmailSent,
            Some(Duration::hours(1)),
        );
        assert_eq!(derive_status(&cred, now), OnboardingStatus::EmailSent);

        // An expired secret is inert: the record falls back to pending.
        let cred = credential(
            PasswordState::DefaultAssigned,
            OnboardingStatus::EmailSent,
            Some(Duration::hours(-1)),
        );
        assert_eq!(derive_status(&cred, now), OnboardingStatus::Pending);
    }

    #[test]
    fn test_pending_is_the_default() {
        let now = Utc::now();
        let cred = credential(PasswordState::Unset, OnboardingStatus::Pending, None);
        assert_eq!(derive_status(&cred, now), OnboardingStatus::Pending);
    }

    #[test]
    fn test_sort_rank_contract_order() {
        assert_eq!(sort_rank(Some(OnboardingStatus::Pending)), 0);
        assert_eq!(sort_rank(Some(OnboardingStatus::EmailSent)), 1);
        assert_eq!(sort_rank(Some(OnboardingStatus::Completed)), 2);
        assert_eq!(sort_rank(None), 3);
    }

    #[test]
    fn test_listing_order_groups_then_newest_first() {
        let now = Utc::now();
        let older = now - Duration::days(1);

        let mut rows = vec![
            (Some(OnboardingStatus::Completed), now),
            (Some(OnboardingStatus::Pending), older),
            (None, now),
            (Some(OnboardingStatus::EmailSent), now),
            (Some(OnboardingStatus::Pending), now),
        ];
        rows.sort_by(|a, b| listing_order(*a, *b));

        assert_eq!(
            rows,
            vec![
                (Some(OnboardingStatus::Pending), now),
                (Some(OnboardingStatus::Pending), older),
                (Some(OnboardingStatus::EmailSent), now),
                (Some(OnboardingStatus::Completed), now),
                (None, now),
            ]
        );
    }
}
