//! Application state shared across handlers.

use std::sync::Arc;

use tower_sessions_moka_store::MokaStore;

use crate::api::ApiClient;
use crate::config::WebConfig;
use crate::middleware::create_session_store;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds the configuration, the marketplace
/// API client (with its connection pool and catalog cache) and the session
/// store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    api: ApiClient,
    sessions: MokaStore,
}

impl AppState {
    /// Create the state, building an API client from the configuration.
    #[must_use]
    pub fn new(config: WebConfig) -> Self {
        let api = ApiClient::new(config.api_url.clone(), config.catalog_cache_ttl);
        Self::with_api(config, api)
    }

    /// Create the state around an existing API client.
    #[must_use]
    pub fn with_api(config: WebConfig, api: ApiClient) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                sessions: create_session_store(),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    /// Get a reference to the marketplace API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// The store behind the session layer.
    #[must_use]
    pub fn sessions(&self) -> &MokaStore {
        &self.inner.sessions
    }
}
