//! Web client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MARKETPLACE_API_URL` - Base URL of the Toys Marketplace REST API
//!
//! ## Optional
//! - `WEB_HOST` - Bind address (default: 127.0.0.1)
//! - `WEB_PORT` - Listen port (default: 3000)
//! - `WEB_BASE_URL` - Public URL of this client (default: `http://localhost:3000`).
//!   An `https` URL turns on secure session cookies.
//! - `CATALOG_CACHE_TTL_SECS` - Lifetime of cached category/product lists (default: 60)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `LOG_FORMAT` - `json` for JSON lines, anything else for text (read by [`LogFormat`])

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: &str = "3000";
const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_CATALOG_CACHE_TTL_SECS: &str = "60";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Web client configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Marketplace REST API base URL
    pub api_url: Url,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for this client
    pub base_url: Url,
    /// How long category and product lists stay cached
    pub catalog_cache_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<SecretString>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Output format of the server logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    /// JSON lines for log shippers
    Json,
}

impl LogFormat {
    /// Read `LOG_FORMAT`, loading `.env` first.
    ///
    /// The tracing subscriber is built from this before [`WebConfig`] is
    /// loaded, so `.env` must already be applied when `RUST_LOG` is read.
    #[must_use]
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    #[must_use]
    pub fn from_lookup(env: impl Fn(&str) -> Option<String>) -> Self {
        match get_optional_env(env, "LOG_FORMAT") {
            Some(format) if format.trim().eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

impl WebConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = parse_url("MARKETPLACE_API_URL", &get_required_env(&env, "MARKETPLACE_API_URL")?)?;
        let host = get_env_or_default(&env, "WEB_HOST", DEFAULT_HOST)
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("WEB_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default(&env, "WEB_PORT", DEFAULT_PORT)
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("WEB_PORT".to_string(), e.to_string()))?;
        let base_url = parse_url(
            "WEB_BASE_URL",
            &get_env_or_default(&env, "WEB_BASE_URL", DEFAULT_BASE_URL),
        )?;
        let ttl_secs = get_env_or_default(&env, "CATALOG_CACHE_TTL_SECS", DEFAULT_CATALOG_CACHE_TTL_SECS)
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("CATALOG_CACHE_TTL_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            api_url,
            host,
            port,
            base_url,
            catalog_cache_ttl: Duration::from_secs(ttl_secs),
            sentry_dsn: get_optional_env(&env, "SENTRY_DSN").map(SecretString::from),
            sentry_environment: get_optional_env(&env, "SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies must carry the `Secure` flag.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(env: impl Fn(&str) -> Option<String>, key: &str) -> Result<String, ConfigError> {
    get_optional_env(env, key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Blank values count as unset.
fn get_optional_env(env: impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    env(key).filter(|value| !value.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(env: impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    get_optional_env(env, key).unwrap_or_else(|| default.to_string())
}

/// Parse an absolute http(s) URL.
fn parse_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<WebConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        WebConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_missing_api_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "MARKETPLACE_API_URL"));
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("MARKETPLACE_API_URL", "http://localhost:8000")]).unwrap();
        assert_eq!(config.api_url.as_str(), "http://localhost:8000/");
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.base_url.as_str(), "http://localhost:3000/");
        assert_eq!(config.catalog_cache_ttl, Duration::from_secs(60));
        assert!(!config.secure_cookies());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("MARKETPLACE_API_URL", "https://api.toys.example/v1"),
            ("WEB_HOST", "0.0.0.0"),
            ("WEB_PORT", "8080"),
            ("WEB_BASE_URL", "https://toys.example"),
            ("CATALOG_CACHE_TTL_SECS", "0"),
            ("SENTRY_DSN", "https://key@sentry.example/1"),
            ("SENTRY_ENVIRONMENT", "staging"),
        ])
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert!(config.secure_cookies());
        assert_eq!(config.catalog_cache_ttl, Duration::ZERO);
        assert_eq!(
            config.sentry_dsn.as_ref().unwrap().expose_secret(),
            "https://key@sentry.example/1"
        );
        assert_eq!(config.sentry_environment.as_deref(), Some("staging"));
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[("MARKETPLACE_API_URL", "http://localhost:8000"), ("WEB_PORT", "http")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "WEB_PORT"));
    }

    #[test]
    fn test_rejects_non_http_api_url() {
        let err = load(&[("MARKETPLACE_API_URL", "ftp://files.example")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "MARKETPLACE_API_URL"));

        let err = load(&[("MARKETPLACE_API_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_blank_optional_is_unset() {
        let config = load(&[("MARKETPLACE_API_URL", "http://localhost:8000"), ("SENTRY_DSN", "  ")])
            .unwrap();
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_log_format() {
        let format = |value: Option<&str>| {
            LogFormat::from_lookup(|key| {
                assert_eq!(key, "LOG_FORMAT");
                value.map(String::from)
            })
        };
        assert_eq!(format(None), LogFormat::Text);
        assert_eq!(format(Some("text")), LogFormat::Text);
        assert_eq!(format(Some(" JSON ")), LogFormat::Json);
        assert_eq!(format(Some("yaml")), LogFormat::Text);
    }

    #[test]
    fn test_debug_redacts_sentry_dsn() {
        let config = load(&[
            ("MARKETPLACE_API_URL", "http://localhost:8000"),
            ("SENTRY_DSN", "https://super_secret_key@sentry.example/1"),
        ])
        .unwrap();
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("super_secret_key"));
    }
}
