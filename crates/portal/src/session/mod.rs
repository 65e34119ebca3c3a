//! Dual-domain session management.
//!
//! Two independent session kinds share the `{issue, validate, revoke}`
//! shape:
//!
//! - the **client flag session** rides the tower-sessions layer (see
//!   `middleware::session`): presence of a `CurrentClient` payload is the
//!   authenticated marker, resolved per request by the auth extractors;
//! - the **admin session** is a richer server-held object in
//!   [`store::AdminSessionStore`], addressed by an opaque identifier carried
//!   in the [`cookie`] transport.

pub mod cookie;
pub mod store;

pub use store::{AdminSession, AdminSessionStore, PendingTicket, SessionError};
