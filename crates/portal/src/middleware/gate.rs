//! Admin route gate.
//!
//! Cheap, side-effect-free interception for the administrative path prefix:
//! outside a small allow-list, a request without the admin session cookie is
//! redirected to the login page with the original path preserved as the
//! return target. Whether the cookie names a *valid* session is deliberately
//! not decided here; that belongs to the `RequireAdminAuth` extractor on the
//! handlers, and duplicating it would make the gate stateful.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::session::cookie::has_session_cookie;

/// Path prefix of the administrative surface.
const ADMIN_PREFIX: &str = "/admin";

/// Paths reachable without a session cookie (login page and the two-phase
/// completion endpoint).
const ALLOW_LIST: &[&str] = &["/admin/auth/login", "/admin/auth/complete"];

/// Gate middleware for the admin subtree.
pub async fn admin_gate(request: Request, next: Next) -> Response {
    let path = request.uri().path();

    if !requires_cookie(path) || has_session_cookie(request.headers()) {
        return next.run(request).await;
    }

    let target = format!("/admin/auth/login?next={}", urlencoding::encode(path));
    Redirect::to(&target).into_response()
}

/// Whether a path is gated on cookie presence.
fn requires_cookie(path: &str) -> bool {
    path.starts_with(ADMIN_PREFIX) && !ALLOW_LIST.contains(&path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list_paths_pass() {
        assert!(!requires_cookie("/admin/auth/login"));
        assert!(!requires_cookie("/admin/auth/complete"));
    }

    #[test]
    fn test_admin_paths_are_gated() {
        assert!(requires_cookie("/admin/clients"));
        assert!(requires_cookie("/admin"));
        assert!(requires_cookie("/admin/auth/logout"));
    }

    #[test]
    fn test_non_admin_paths_pass() {
        assert!(!requires_cookie("/auth/login"));
        assert!(!requires_cookie("/"));
        assert!(!requires_cookie("/account"));
    }

    #[test]
    fn test_lookalike_prefix_is_not_allow_listed() {
        // Only exact allow-list matches skip the gate.
        assert!(requires_cookie("/admin/auth/login2"));
        assert!(requires_cookie("/admin/auth/complete/extra"));
    }
}
