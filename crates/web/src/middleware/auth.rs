//! Authentication state and route guard extractors.
//!
//! [`ClientSession`] is the per-visitor client state (user, token, cart
//! badge, toasts) backed by tower-sessions. [`RequireAuth`] and
//! [`RequireAdmin`] enforce the route access policy.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use tower_sessions::Session;

use toys_marketplace_core::{Access, AccessPolicy, User, Viewer};

use crate::api::ApiError;
use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::models::{AccessToken, Toast, session_keys};

// =============================================================================
// ClientSession
// =============================================================================

/// The visitor's client state, loaded from the session.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(client: ClientSession) -> impl IntoResponse {
///     match client.user() {
///         Some(user) => format!("Hello, {}!", user.display_name()),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
#[derive(Clone)]
pub struct ClientSession {
    session: Session,
    user: Option<User>,
    token: Option<AccessToken>,
}

impl ClientSession {
    /// Load the client state from a session.
    pub async fn load(session: Session) -> Self {
        let user = session
            .get::<User>(session_keys::CURRENT_USER)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to read user from session");
                None
            });
        let token = session
            .get::<AccessToken>(session_keys::ACCESS_TOKEN)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to read token from session");
                None
            });

        // A user without a token cannot call the API; treat as signed out
        let (user, token) = match (user, token) {
            (Some(user), Some(token)) => (Some(user), Some(token)),
            _ => (None, None),
        };

        Self {
            session,
            user,
            token,
        }
    }

    /// The signed-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// The bearer token of the signed-in user, if any.
    #[must_use]
    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_ref().map(AccessToken::secret)
    }

    #[must_use]
    pub fn viewer(&self) -> Viewer {
        Viewer::of(self.user())
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Store a freshly issued token and its user.
    ///
    /// The session ID is rotated to prevent fixation.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be written.
    pub async fn sign_in(
        &mut self,
        token: AccessToken,
        user: User,
    ) -> Result<(), tower_sessions::session::Error> {
        self.session.cycle_id().await?;
        self.session
            .insert(session_keys::ACCESS_TOKEN, &token)
            .await?;
        self.session
            .insert(session_keys::CURRENT_USER, &user)
            .await?;
        set_sentry_user(&user.id, Some(user.email.as_str()));

        self.token = Some(token);
        self.user = Some(user);
        Ok(())
    }

    /// Remove the user, token and cart count. Pending toasts survive.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be written.
    pub async fn sign_out(&mut self) -> Result<(), tower_sessions::session::Error> {
        self.user = None;
        self.token = None;
        self.session
            .remove_value(session_keys::CURRENT_USER)
            .await?;
        self.session
            .remove_value(session_keys::ACCESS_TOKEN)
            .await?;
        self.session.remove_value(session_keys::CART_COUNT).await?;
        clear_sentry_user();
        Ok(())
    }

    /// Pass an API result through, signing out when the API rejected the
    /// token.
    pub async fn check<T>(&mut self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        if let Err(e) = &result
            && e.is_unauthorized()
            && self.is_authenticated()
        {
            tracing::info!("API rejected session token, signing out");
            if let Err(e) = self.sign_out().await {
                tracing::error!(error = %e, "Failed to clear session after 401");
            }
        }
        result
    }

    /// Units in the cart, as last loaded.
    pub async fn cart_count(&self) -> u32 {
        if !self.is_authenticated() {
            return 0;
        }
        self.session
            .get::<u32>(session_keys::CART_COUNT)
            .await
            .ok()
            .flatten()
            .unwrap_or(0)
    }

    /// Remember the cart badge count.
    pub async fn set_cart_count(&self, count: u32) {
        if let Err(e) = self.session.insert(session_keys::CART_COUNT, count).await {
            tracing::error!(error = %e, "Failed to store cart count");
        }
    }

    /// Queue a toast for the next rendered page.
    pub async fn toast(&self, toast: Toast) {
        let mut toasts = self.pending_toasts().await;
        toasts.push(toast);
        if let Err(e) = self.session.insert(session_keys::TOASTS, &toasts).await {
            tracing::error!(error = %e, "Failed to store toast");
        }
    }

    pub async fn success(&self, message: impl Into<String>) {
        self.toast(Toast::success(message)).await;
    }

    pub async fn error(&self, message: impl Into<String>) {
        self.toast(Toast::error(message)).await;
    }

    /// Remove and return every queued toast.
    ///
    /// An anonymous session holds nothing but toasts, so once they are
    /// drained its record is deleted from the store.
    pub async fn take_toasts(&self) -> Vec<Toast> {
        let toasts = self
            .session
            .remove::<Vec<Toast>>(session_keys::TOASTS)
            .await
            .ok()
            .flatten()
            .unwrap_or_default();

        if !toasts.is_empty()
            && !self.is_authenticated()
            && self.session.is_empty().await
            && let Err(e) = self.session.flush().await
        {
            tracing::error!(error = %e, "Failed to delete drained session");
        }
        toasts
    }

    async fn pending_toasts(&self) -> Vec<Toast> {
        self.session
            .get::<Vec<Toast>>(session_keys::TOASTS)
            .await
            .ok()
            .flatten()
            .unwrap_or_default()
    }
}

/// Rejection when the session layer is missing from the stack.
pub struct MissingSession;

impl IntoResponse for MissingSession {
    fn into_response(self) -> Response {
        AppError::Internal("session layer missing from the middleware stack".to_string())
            .into_response()
    }
}

impl<S> FromRequestParts<S> for ClientSession
where
    S: Send + Sync,
{
    type Rejection = MissingSession;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(MissingSession)?;

        Ok(Self::load(session).await)
    }
}

// =============================================================================
// Guards
// =============================================================================

/// A signed-in visitor. Produced by [`RequireAuth`] and [`RequireAdmin`].
pub struct SignedIn {
    pub client: ClientSession,
    pub user: User,
    pub token: SecretString,
}

impl SignedIn {
    async fn extract(parts: &mut Parts, policy: AccessPolicy) -> Result<Self, AuthRejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AuthRejection::MissingSession)?;
        let client = ClientSession::load(session).await;

        if let Access::RedirectTo(path) = policy.check(client.viewer()) {
            return Err(AuthRejection::Redirect(path));
        }

        match (client.user().cloned(), client.token().cloned()) {
            (Some(user), Some(token)) => Ok(Self {
                client,
                user,
                token,
            }),
            _ => Err(AuthRejection::Redirect("/login")),
        }
    }
}

/// Extractor for routes that need a signed-in user.
///
/// Anonymous visitors are redirected to `/login`.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(signed_in): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", signed_in.user.display_name())
/// }
/// ```
pub struct RequireAuth(pub SignedIn);

/// Extractor for admin-only routes.
///
/// Everyone who is not an admin is redirected to `/`.
pub struct RequireAdmin(pub SignedIn);

/// Error returned when a guard rejects the visitor.
pub enum AuthRejection {
    /// Redirect to the given path.
    Redirect(&'static str),
    /// The session layer is missing.
    MissingSession,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Redirect(path) => Redirect::to(path).into_response(),
            Self::MissingSession => MissingSession.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        SignedIn::extract(parts, AccessPolicy::Authenticated)
            .await
            .map(Self)
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        SignedIn::extract(parts, AccessPolicy::Admin).await.map(Self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::{MemoryStore, SessionStore};
    use tower_sessions_moka_store::MokaStore;

    use super::*;

    fn user(is_admin: bool) -> User {
        serde_json::from_value(serde_json::json!({
            "id": 2,
            "username": "user",
            "email": "user@toysmarketplace.com",
            "full_name": "Regular User",
            "is_admin": is_admin,
            "is_active": true,
            "created_at": "2024-01-01T00:00:00"
        }))
        .unwrap()
    }

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_empty_session_is_anonymous() {
        let client = ClientSession::load(session()).await;
        assert!(!client.is_authenticated());
        assert_eq!(client.viewer(), Viewer::Anonymous);
        assert_eq!(client.cart_count().await, 0);
    }

    #[tokio::test]
    async fn test_sign_in_round_trips_through_session() {
        let session = session();
        let mut client = ClientSession::load(session.clone()).await;
        client
            .sign_in(AccessToken::new("tok"), user(true))
            .await
            .unwrap();

        let reloaded = ClientSession::load(session).await;
        assert_eq!(reloaded.viewer(), Viewer::Admin);
        assert!(reloaded.token().is_some());
    }

    #[tokio::test]
    async fn test_user_without_token_is_anonymous() {
        let session = session();
        session
            .insert(session_keys::CURRENT_USER, user(false))
            .await
            .unwrap();
        let client = ClientSession::load(session).await;
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn test_sign_out_keeps_toasts() {
        let session = session();
        let mut client = ClientSession::load(session.clone()).await;
        client
            .sign_in(AccessToken::new("tok"), user(false))
            .await
            .unwrap();
        client.set_cart_count(3).await;
        client.success("Logged out successfully").await;

        client.sign_out().await.unwrap();

        let reloaded = ClientSession::load(session).await;
        assert!(!reloaded.is_authenticated());
        assert_eq!(reloaded.cart_count().await, 0);
        assert_eq!(
            reloaded.take_toasts().await,
            vec![Toast::success("Logged out successfully")]
        );
    }

    #[tokio::test]
    async fn test_drained_anonymous_session_is_deleted() {
        let store = MokaStore::new(Some(16));
        let session = Session::new(None, Arc::new(store.clone()), None);
        let client = ClientSession::load(session.clone()).await;
        client.error("Please log in to add items to cart").await;
        session.save().await.unwrap();
        let id = session.id().unwrap();
        assert!(store.load(&id).await.unwrap().is_some());

        let toasts = ClientSession::load(session.clone()).await.take_toasts().await;

        assert_eq!(toasts.len(), 1);
        assert!(store.load(&id).await.unwrap().is_none());
        assert!(session.id().is_none());
    }

    #[tokio::test]
    async fn test_drained_signed_in_session_is_kept() {
        let store = MokaStore::new(Some(16));
        let session = Session::new(None, Arc::new(store.clone()), None);
        let mut client = ClientSession::load(session.clone()).await;
        client
            .sign_in(AccessToken::new("tok"), user(false))
            .await
            .unwrap();
        client.success("Login successful!").await;
        session.save().await.unwrap();
        let id = session.id().unwrap();

        assert_eq!(client.take_toasts().await.len(), 1);
        session.save().await.unwrap();

        assert_eq!(session.id(), Some(id));
        assert!(store.load(&id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_check_tears_down_on_unauthorized() {
        let mut client = ClientSession::load(session()).await;
        client
            .sign_in(AccessToken::new("expired"), user(false))
            .await
            .unwrap();

        let result: Result<(), ApiError> = Err(ApiError::Unauthorized { detail: None });
        assert!(client.check(result).await.is_err());
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn test_check_keeps_session_on_other_errors() {
        let mut client = ClientSession::load(session()).await;
        client
            .sign_in(AccessToken::new("tok"), user(false))
            .await
            .unwrap();

        let result: Result<(), ApiError> = Err(ApiError::Status {
            status: reqwest::StatusCode::NOT_FOUND,
            detail: Some("Cart item not found".to_string()),
        });
        assert!(client.check(result).await.is_err());
        assert!(client.is_authenticated());
    }

    #[tokio::test]
    async fn test_take_toasts_drains() {
        let client = ClientSession::load(session()).await;
        client.error("Failed to load cart items").await;
        client.success("Cart cleared").await;

        assert_eq!(client.take_toasts().await.len(), 2);
        assert!(client.take_toasts().await.is_empty());
    }
}
