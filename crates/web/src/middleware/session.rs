//! Session middleware configuration.
//!
//! Sessions live in process memory. They only hold the visitor's client
//! state (user, bearer token, cart badge, toasts); the marketplace API
//! owns everything else, so a restart simply signs everyone out.

use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_moka_store::MokaStore;

use crate::config::WebConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "tm_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Most session records held at once.
const SESSION_STORE_CAPACITY: u64 = 100_000;

/// Create the in-memory session store.
///
/// Each record is evicted when its session expires, and the least recently
/// used records go first once the store is full.
#[must_use]
pub fn create_session_store() -> MokaStore {
    MokaStore::new(Some(SESSION_STORE_CAPACITY))
}

/// Create the session layer over `store`.
///
/// Cookies are marked `Secure` when the public base URL is https.
#[must_use]
pub fn create_session_layer(config: &WebConfig, store: MokaStore) -> SessionManagerLayer<MokaStore> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.secure_cookies())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
