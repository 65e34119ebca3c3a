//! HTTP middleware: auth extractors, the admin route gate, the client
//! session layer and rate limiting.

pub mod auth;
pub mod gate;
pub mod rate_limit;
pub mod session;

pub use auth::{
    OptionalClientAuth, RequireAdminAuth, RequireClientAuth, clear_current_client,
    set_current_client,
};
pub use gate::admin_gate;
pub use rate_limit::auth_rate_limiter;
pub use session::create_session_layer;
