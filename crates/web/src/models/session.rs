//! Session-related types.
//!
//! The session is the client-side state of one visitor: the bearer token,
//! the user it belongs to, the cart badge count and any pending toasts.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Bearer token issued by the marketplace API.
///
/// `Debug` never prints the token.
#[derive(Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    #[must_use]
    pub const fn secret(&self) -> &SecretString {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

impl Serialize for AccessToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0.expose_secret())
    }
}

impl<'de> Deserialize<'de> for AccessToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// Severity of a toast notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    Success,
    Error,
}

/// A one-shot notification shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            message: message.into(),
        }
    }

    /// CSS modifier class for the template.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self.kind {
            ToastKind::Success => "toast-success",
            ToastKind::Error => "toast-error",
        }
    }
}

/// Session keys for client state.
pub mod keys {
    /// Key for the signed-in user (`toys_marketplace_core::User`).
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the API bearer token.
    pub const ACCESS_TOKEN: &str = "access_token";

    /// Key for the number of units in the cart (navbar badge).
    pub const CART_COUNT: &str = "cart_count";

    /// Key for toasts waiting to be rendered.
    pub const TOASTS: &str = "toasts";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_debug_redacts() {
        let token = AccessToken::new("eyJhbGciOiJIUzI1NiJ9.secret");
        let debug_output = format!("{token:?}");
        assert!(!debug_output.contains("secret"));
        assert!(debug_output.contains("[REDACTED]"));
    }

    #[test]
    fn test_access_token_serde() {
        let token = AccessToken::new("abc.def");
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(json, "\"abc.def\"");

        let back: AccessToken = serde_json::from_str(&json).unwrap();
        assert_eq!(back.secret().expose_secret(), "abc.def");
    }

    #[test]
    fn test_toast_css_class() {
        assert_eq!(Toast::success("Cart updated!").css_class(), "toast-success");
        assert_eq!(Toast::error("Failed to update cart").css_class(), "toast-error");
    }
}
