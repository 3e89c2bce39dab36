//! Login, registration and logout.

use toys_marketplace_core::forms::{LoginDraft, RegisterDraft};

use crate::api::ApiClient;
use crate::error::{Result, add_breadcrumb};
use crate::middleware::ClientSession;
use crate::models::AccessToken;
use crate::services::cart;

/// What the handler should do after a login or registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The action succeeded; redirect.
    Succeeded,
    /// Something was rejected and a toast explains why; re-render the form.
    Rejected,
}

/// Sign in with email and password.
///
/// On success the token and user are stored, the cart badge is refreshed
/// and a "Login successful!" toast is queued.
///
/// # Errors
///
/// Returns an error only if the session store fails.
pub async fn login(
    api: &ApiClient,
    client: &mut ClientSession,
    draft: &LoginDraft,
) -> Result<Outcome> {
    let request = match draft.validate() {
        Ok(request) => request,
        Err(e) => {
            client.error(e.to_string()).await;
            return Ok(Outcome::Rejected);
        }
    };

    let token = match api.login(&request.email, &request.password).await {
        Ok(token) => AccessToken::new(token.access_token),
        Err(e) => {
            tracing::info!(error = %e, "Login rejected");
            client.error(e.user_message("Login failed")).await;
            return Ok(Outcome::Rejected);
        }
    };

    let user = match api.me(token.secret()).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch user after login");
            client.error(e.user_message("Login failed")).await;
            return Ok(Outcome::Rejected);
        }
    };

    tracing::info!(user_id = %user.id, "User logged in");
    client.sign_in(token, user).await?;
    cart::refresh_count(api, client).await;
    add_breadcrumb("auth", "Logged in", None);
    client.success("Login successful!").await;

    Ok(Outcome::Succeeded)
}

/// Create an account. The visitor still has to log in afterwards.
///
/// # Errors
///
/// Returns an error only if the session store fails.
pub async fn register(
    api: &ApiClient,
    client: &ClientSession,
    draft: &RegisterDraft,
) -> Result<Outcome> {
    let request = match draft.validate() {
        Ok(request) => request,
        Err(e) => {
            client.error(e.to_string()).await;
            return Ok(Outcome::Rejected);
        }
    };

    match api.register(&request).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "User registered");
            client
                .success("Registration successful! Please log in.")
                .await;
            Ok(Outcome::Succeeded)
        }
        Err(e) => {
            tracing::info!(error = %e, "Registration rejected");
            client.error(e.user_message("Registration failed")).await;
            Ok(Outcome::Rejected)
        }
    }
}

/// Forget the user, token and cart count.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn logout(client: &mut ClientSession) -> Result<()> {
    if let Some(user) = client.user() {
        tracing::info!(user_id = %user.id, "User logged out");
    }
    client.sign_out().await?;
    client.success("Logged out successfully").await;
    Ok(())
}
