//! Authentication route handlers.
//!
//! Login and registration pages render without the sidebar layout. A
//! rejected submission re-renders the form with the entered values (never
//! the passwords) and a toast explaining why.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use toys_marketplace_core::forms::{LoginDraft, MIN_PASSWORD_LENGTH, RegisterDraft};

use crate::error::Result;
use crate::filters;
use crate::layout::Layout;
use crate::middleware::{ClientSession, CspNonce};
use crate::services::auth::{self, Outcome};
use crate::state::AppState;

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub email: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub layout: Layout,
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub min_password_length: usize,
}

impl RegisterTemplate {
    async fn for_draft(client: &ClientSession, nonce: CspNonce, draft: &RegisterDraft) -> Self {
        Self {
            layout: Layout::build(client, nonce, "/register").await,
            email: draft.email.trim().to_string(),
            username: draft.username.trim().to_string(),
            full_name: draft.full_name.trim().to_string(),
            min_password_length: MIN_PASSWORD_LENGTH,
        }
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
#[instrument(skip_all)]
pub async fn login_page(client: ClientSession, nonce: CspNonce) -> impl IntoResponse {
    LoginTemplate {
        layout: Layout::build(&client, nonce, "/login").await,
        email: String::new(),
    }
}

/// Handle login form submission.
///
/// # Errors
///
/// Returns an error if the session store fails.
#[instrument(skip_all, fields(email = %form.email.trim()))]
pub async fn login(
    State(state): State<AppState>,
    mut client: ClientSession,
    nonce: CspNonce,
    Form(form): Form<LoginDraft>,
) -> Result<Response> {
    match auth::login(state.api(), &mut client, &form).await? {
        Outcome::Succeeded => Ok(Redirect::to("/").into_response()),
        Outcome::Rejected => Ok(LoginTemplate {
            layout: Layout::build(&client, nonce, "/login").await,
            email: form.email.trim().to_string(),
        }
        .into_response()),
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
#[instrument(skip_all)]
pub async fn register_page(client: ClientSession, nonce: CspNonce) -> impl IntoResponse {
    RegisterTemplate::for_draft(&client, nonce, &RegisterDraft::default()).await
}

/// Handle registration form submission.
///
/// # Errors
///
/// Returns an error if the session store fails.
#[instrument(skip_all, fields(email = %form.email.trim(), username = %form.username.trim()))]
pub async fn register(
    State(state): State<AppState>,
    client: ClientSession,
    nonce: CspNonce,
    Form(form): Form<RegisterDraft>,
) -> Result<Response> {
    match auth::register(state.api(), &client, &form).await? {
        Outcome::Succeeded => Ok(Redirect::to("/login").into_response()),
        Outcome::Rejected => Ok(RegisterTemplate::for_draft(&client, nonce, &form)
            .await
            .into_response()),
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout.
///
/// # Errors
///
/// Returns an error if the session store fails.
#[instrument(skip_all)]
pub async fn logout(mut client: ClientSession) -> Result<Redirect> {
    auth::logout(&mut client).await?;
    Ok(Redirect::to("/"))
}
