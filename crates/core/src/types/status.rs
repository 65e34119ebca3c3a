//! Status enums for credential lifecycle and onboarding.

use serde::{Deserialize, Serialize};

/// Client onboarding stage.
///
/// Stored per client and advanced as the password-setup flow progresses.
/// The progression `pending -> email_sent -> completed` is advisory; the
/// store never enforces it as a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStatus {
    /// No setup email has been sent yet.
    #[default]
    Pending,
    /// A setup email went out; the client has not chosen a password.
    EmailSent,
    /// The client has set their own password.
    Completed,
}

impl std::fmt::Display for OnboardingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::EmailSent => write!(f, "email_sent"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for OnboardingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "email_sent" => Ok(Self::EmailSent),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("invalid onboarding status: {s}")),
        }
    }
}

/// The provenance of a client's stored password.
///
/// Explicit tri-state instead of comparing the hash against a shared
/// sentinel value: a client who legitimately picks the default string as
/// their own password still ends up `UserSet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PasswordState {
    /// No credential at all.
    #[default]
    Unset,
    /// The shared default credential assigned at record creation.
    DefaultAssigned,
    /// A password the client chose for themselves.
    UserSet,
}

impl PasswordState {
    /// Returns true once the client has personalized their password.
    #[must_use]
    pub const fn is_user_set(self) -> bool {
        matches!(self, Self::UserSet)
    }
}

impl std::fmt::Display for PasswordState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unset => write!(f, "unset"),
            Self::DefaultAssigned => write!(f, "default_assigned"),
            Self::UserSet => write!(f, "user_set"),
        }
    }
}

impl std::str::FromStr for PasswordState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unset" => Ok(Self::Unset),
            "default_assigned" => Ok(Self::DefaultAssigned),
            "user_set" => Ok(Self::UserSet),
            _ => Err(format!("invalid password state: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_onboarding_status_roundtrip() {
        for status in [
            OnboardingStatus::Pending,
            OnboardingStatus::EmailSent,
            OnboardingStatus::Completed,
        ] {
            let parsed: OnboardingStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_onboarding_status_rejects_unknown() {
        assert!("done".parse::<OnboardingStatus>().is_err());
    }

    #[test]
    fn test_password_state_roundtrip() {
        for state in [
            PasswordState::Unset,
            PasswordState::DefaultAssigned,
            PasswordState::UserSet,
        ] {
            let parsed: PasswordState = state.to_string().parse().unwrap();
            assert_eq!(parsed, state);
        }
    }

    #[test]
    fn test_is_user_set() {
        assert!(PasswordState::UserSet.is_user_set());
        assert!(!PasswordState::DefaultAssigned.is_user_set());
        assert!(!PasswordState::Unset.is_user_set());
    }
}
