//! Client for the Toys Marketplace REST API.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP via `reqwest`
//! - The API is the source of truth. Nothing is stored locally except the
//!   short-lived catalog cache.
//! - Category and product listings are cached in memory via `moka`. Any
//!   successful catalog mutation empties the cache.
//! - Cart and auth calls always hit the API.
//!
//! # Example
//!
//! ```rust,ignore
//! use toys_marketplace_web::api::ApiClient;
//!
//! let api = ApiClient::new(config.api_url.clone(), config.catalog_cache_ttl);
//!
//! let token = api.login("user@toysmarketplace.com", "user123").await?;
//! let token = SecretString::from(token.access_token);
//! let user = api.me(&token).await?;
//! let cart = api.get_cart(&token).await?;
//! ```

mod cache;
mod client;

pub use client::ApiClient;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when calling the marketplace API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API rejected the bearer token (or the login credentials).
    #[error("Unauthorized: {}", .detail.as_deref().unwrap_or("no detail"))]
    Unauthorized { detail: Option<String> },

    /// Any other non-2xx response.
    #[error("API returned {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Build an error from a non-success status and its response body.
    pub(crate) fn from_response(status: StatusCode, body: &str) -> Self {
        let detail = parse_detail(body);
        if status == StatusCode::UNAUTHORIZED {
            Self::Unauthorized { detail }
        } else {
            Self::Status { status, detail }
        }
    }

    /// Whether the session's token should be discarded.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// The server-provided `detail` message, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { detail } | Self::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Message to show the user: the server detail when present, otherwise
    /// `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        self.detail().unwrap_or(fallback).to_string()
    }
}

/// FastAPI error body: `{"detail": "..."}`.
#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Extract a string `detail` from an error body. Validation errors (where
/// `detail` is a list) and non-JSON bodies yield `None`.
fn parse_detail(body: &str) -> Option<String> {
    let body: ErrorBody = serde_json::from_str(body).ok()?;
    body.detail
        .as_str()
        .map(str::trim)
        .filter(|detail| !detail.is_empty())
        .map(String::from)
}
