//! Profile page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::Query,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use toys_marketplace_core::User;
use toys_marketplace_core::navigation::ProfileTab;

use crate::filters;
use crate::layout::Layout;
use crate::middleware::{CspNonce, RequireAuth};

#[derive(Debug, Default, Deserialize)]
pub struct ProfileQuery {
    pub tab: Option<String>,
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub layout: Layout,
    pub user: User,
    pub tab: ProfileTab,
    pub tabs: [ProfileTab; 2],
}

/// Display the signed-in user's profile.
///
/// Uses the user stored at login; nothing is fetched.
#[instrument(skip(signed_in, nonce))]
pub async fn show(
    RequireAuth(signed_in): RequireAuth,
    nonce: CspNonce,
    Query(query): Query<ProfileQuery>,
) -> impl IntoResponse {
    ProfileTemplate {
        layout: Layout::build(&signed_in.client, nonce, "/profile").await,
        user: signed_in.user,
        tab: ProfileTab::parse(query.tab.as_deref()),
        tabs: ProfileTab::ALL,
    }
}
