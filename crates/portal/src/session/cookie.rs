//! Admin session cookie transport.
//!
//! The cookie carries only the opaque session identifier; everything else
//! stays server-side. Built and parsed by hand against the plain axum header
//! types.

use axum::http::{HeaderMap, HeaderValue, header::COOKIE, header::InvalidHeaderValue};

/// Name of the admin session cookie.
pub const ADMIN_SESSION_COOKIE: &str = "admin_session";

/// Build a secure `HttpOnly` cookie carrying the session identifier.
///
/// # Errors
///
/// Returns `InvalidHeaderValue` if the identifier contains bytes illegal in a
/// header (never the case for the base64url ids this portal issues).
pub fn session_cookie(
    session_id: &str,
    max_age_secs: i64,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{ADMIN_SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Build the cookie that clears the admin session.
///
/// # Errors
///
/// Returns `InvalidHeaderValue` if header construction fails (it cannot for
/// this fixed shape).
pub fn clear_session_cookie(secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{ADMIN_SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Extract the admin session identifier from request headers, if present.
#[must_use]
pub fn extract_session_id(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == ADMIN_SESSION_COOKIE {
            return Some(val.to_string());
        }
    }
    None
}

/// Whether the request carries the admin session cookie at all.
///
/// Presence only; validity is the session store's business.
#[must_use]
pub fn has_session_cookie(headers: &HeaderMap) -> bool {
    extract_session_id(headers).is_some()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_session_cookie_shape() {
        let cookie = session_cookie("abc123", 86_400, false).unwrap();
        assert_eq!(
            cookie.to_str().unwrap(),
            "admin_session=abc123; Path=/; HttpOnly; SameSite=Lax; Max-Age=86400"
        );
    }

    #[test]
    fn test_session_cookie_secure_flag() {
        let cookie = session_cookie("abc123", 86_400, true).unwrap();
        assert!(cookie.to_str().unwrap().ends_with("; Secure"));
    }

    #[test]
    fn test_clear_cookie_zeroes_max_age() {
        let cookie = clear_session_cookie(false).unwrap();
        assert!(cookie.to_str().unwrap().contains("Max-Age=0"));
    }

    #[test]
    fn test_extract_from_single_cookie() {
        let headers = headers_with_cookie("admin_session=abc123");
        assert_eq!(extract_session_id(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_extract_from_multiple_cookies() {
        let headers = headers_with_cookie("theme=dark; admin_session=abc123; client_session=zzz");
        assert_eq!(extract_session_id(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_extract_missing() {
        let headers = headers_with_cookie("theme=dark");
        assert!(extract_session_id(&headers).is_none());
        assert!(!has_session_cookie(&headers));

        assert!(extract_session_id(&HeaderMap::new()).is_none());
    }
}
