//! Client code type.
//!
//! The client code is the stable, external-facing handle for a client record.
//! It appears on statements and in correspondence, so it is restricted to a
//! conservative character set.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ClientCode`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum ClientCodeError {
    /// The input string is empty.
    #[error("client code cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("client code must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside `[A-Za-z0-9_-]`.
    #[error("client code may only contain letters, digits, '-' and '_'")]
    InvalidCharacter,
}

/// A client's external-facing account handle.
///
/// ## Constraints
///
/// - Length: 1-32 characters
/// - ASCII letters, digits, `-` and `_` only
///
/// ## Examples
///
/// ```
/// use crestline_core::ClientCode;
///
/// assert!(ClientCode::parse("CL-10042").is_ok());
/// assert!(ClientCode::parse("").is_err());
/// assert!(ClientCode::parse("no spaces").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ClientCode(String);

impl ClientCode {
    /// Maximum length of a client code.
    pub const MAX_LENGTH: usize = 32;

    /// Parse a `ClientCode` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 32 characters, or
    /// contains characters outside the allowed set.
    pub fn parse(s: &str) -> Result<Self, ClientCodeError> {
        if s.is_empty() {
            return Err(ClientCodeError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(ClientCodeError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ClientCodeError::InvalidCharacter);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the client code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `ClientCode` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ClientCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ClientCode {
    type Err = ClientCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ClientCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for ClientCode {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ClientCode {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for ClientCode {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_codes() {
        assert!(ClientCode::parse("CL-10042").is_ok());
        assert!(ClientCode::parse("acme_holdings").is_ok());
        assert!(ClientCode::parse("A1").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(ClientCode::parse(""), Err(ClientCodeError::Empty)));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "a".repeat(33);
        assert!(matches!(
            ClientCode::parse(&long),
            Err(ClientCodeError::TooLong { .. })
        ));
    }

    #[test]
    fn test_parse_invalid_character() {
        assert!(matches!(
            ClientCode::parse("no spaces"),
            Err(ClientCodeError::InvalidCharacter)
        ));
        assert!(matches!(
            ClientCode::parse("shell$"),
            Err(ClientCodeError::InvalidCharacter)
        ));
    }

    #[test]
    fn test_display() {
        let code = ClientCode::parse("CL-10042").unwrap();
        assert_eq!(format!("{code}"), "CL-10042");
    }

    #[test]
    fn test_serde_roundtrip() {
        let code = ClientCode::parse("CL-10042").unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"CL-10042\"");

        let parsed: ClientCode = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, code);
    }
}
