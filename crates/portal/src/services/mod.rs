//! Business-logic services for the portal.

pub mod auth;
pub mod email;
pub mod onboarding;

pub use auth::{AdminAuthService, AuthService};
pub use email::EmailService;
