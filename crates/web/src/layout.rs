//! Page chrome shared by every template: navbar, sidebar and toasts.

use toys_marketplace_core::navigation::{NavItem, nav_items};

use crate::middleware::{ClientSession, CspNonce};
use crate::models::Toast;

/// Data `base.html` needs, built at the end of each page handler.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub nonce: String,
    pub current_path: String,
    /// Full name, else username. `None` when signed out.
    pub user_name: Option<String>,
    pub is_authenticated: bool,
    pub is_admin: bool,
    pub nav: Vec<NavItem>,
    pub cart_count: u32,
    /// Prefill for the navbar search box.
    pub search: String,
    pub toasts: Vec<Toast>,
}

impl Layout {
    /// Build the chrome for `current_path`, draining pending toasts.
    ///
    /// Call this after the handler has queued all of its own toasts.
    pub async fn build(client: &ClientSession, nonce: CspNonce, current_path: &str) -> Self {
        let viewer = client.viewer();
        Self {
            nonce: nonce.0,
            current_path: current_path.to_string(),
            user_name: client.user().map(|user| user.display_name().to_string()),
            is_authenticated: viewer.is_authenticated(),
            is_admin: viewer.is_admin(),
            nav: nav_items(viewer, current_path),
            cart_count: client.cart_count().await,
            search: String::new(),
            toasts: client.take_toasts().await,
        }
    }

    /// Prefill the navbar search box.
    #[must_use]
    pub fn with_search(mut self, term: &str) -> Self {
        self.search = term.trim().to_string();
        self
    }

    /// Whether the cart badge is shown.
    #[must_use]
    pub const fn show_cart_badge(&self) -> bool {
        self.is_authenticated && self.cart_count > 0
    }
}

/// Pick a same-site redirect target from a form's `return_to` field.
///
/// Anything that is not a local absolute path (including `//host`
/// protocol-relative URLs) falls back to `default`.
#[must_use]
pub fn return_to<'a>(candidate: Option<&'a str>, default: &'a str) -> &'a str {
    candidate
        .map(str::trim)
        .filter(|path| path.starts_with('/') && !path.starts_with("//") && !path.contains('\\'))
        .unwrap_or(default)
}
