//! Domain models for the portal.

pub mod admin;
pub mod client;
pub mod session;

pub use admin::{AdminUser, AdminUserRef};
pub use client::{AuthorizedAccount, ClientCredential};
pub use session::{CurrentClient, keys as session_keys};
