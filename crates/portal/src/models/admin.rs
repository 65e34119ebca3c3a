//! Administrator account model.
//!
//! Administrators are a separate identity domain from clients: their records
//! live in `admin_user` and their sessions in the server-held session store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crestline_core::{AdminUserId, Email};

/// An administrator account.
///
/// Contains the password hash -- never serialize this to responses directly.
#[derive(Debug, Clone)]
pub struct AdminUser {
    /// Database ID.
    pub id: AdminUserId,
    /// Unique login email.
    pub email: Email,
    /// Display name.
    pub display_name: String,
    /// Argon2id hash of the administrator's password.
    pub password_hash: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl AdminUser {
    /// The identity payload carried by an admin session.
    #[must_use]
    pub fn session_ref(&self) -> AdminUserRef {
        AdminUserRef {
            id: self.id,
            email: self.email.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

/// Minimal admin identity stored inside an `AdminSession`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUserRef {
    /// Admin's database ID.
    pub id: AdminUserId,
    /// Admin's email address.
    pub email: Email,
    /// Admin's display name.
    pub display_name: String,
}
