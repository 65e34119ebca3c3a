//! Client session payload.
//!
//! The client session is the simple "flag" domain: presence of a
//! [`CurrentClient`] record in the session is the authenticated marker, and
//! the record lists every account the login may act on behalf of. It is
//! resolved once per request by the auth extractors and threaded to handlers;
//! nothing reads it ad hoc.

use serde::{Deserialize, Serialize};

use crate::models::client::AuthorizedAccount;

/// Session-stored client identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentClient {
    /// Accounts this session is entitled to act on behalf of. Never empty.
    pub accounts: Vec<AuthorizedAccount>,
}

/// Session keys for client authentication data.
pub mod keys {
    /// Key for storing the current logged-in client.
    pub const CURRENT_CLIENT: &str = "current_client";
}
