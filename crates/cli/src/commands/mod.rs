//! CLI subcommands.

pub mod catalog;
pub mod health;
pub mod seed;

use std::time::Duration;

use toys_marketplace_web::api::ApiClient;
use url::Url;

/// API client for one-shot commands. Caching is off so every listing reflects
/// the writes that came before it.
pub fn api_client(base_url: Url) -> ApiClient {
    ApiClient::new(base_url, Duration::ZERO)
}
