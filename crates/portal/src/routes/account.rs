//! Client account overview.
//!
//! The portfolio views themselves live elsewhere; this page only shows which
//! accounts the session may act on behalf of.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::{IntoResponse, Redirect};

use crate::filters;
use crate::middleware::{OptionalClientAuth, RequireClientAuth};
use crate::models::client::AuthorizedAccount;

/// Account overview template.
#[derive(Template, WebTemplate)]
#[template(path = "account/overview.html")]
pub struct AccountTemplate {
    pub accounts: Vec<AuthorizedAccount>,
}

/// Portal landing page: send clients where they belong.
///
/// GET /
pub async fn home(OptionalClientAuth(client): OptionalClientAuth) -> impl IntoResponse {
    if client.is_some() {
        Redirect::to("/account")
    } else {
        Redirect::to("/auth/login")
    }
}

/// Display the account overview.
///
/// GET /account
pub async fn overview(RequireClientAuth(client): RequireClientAuth) -> impl IntoResponse {
    AccountTemplate {
        accounts: client.accounts,
    }
}
