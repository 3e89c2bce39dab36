//! Marketplace REST API client implementation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;
use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use toys_marketplace_core::{
    CartItem, CartItemId, CartItemUpdate, Category, CategoryId, LoginRequest, NewCartItem,
    NewCategory, NewProduct, Product, ProductId, ProductQuery, RegisterRequest, Token, User,
};

use super::ApiError;
use super::cache::{CacheKey, CacheValue};

/// Upper bound on cached catalog listings.
const CACHE_CAPACITY: u64 = 256;

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the Toys Marketplace REST API.
///
/// Cheap to clone. Catalog listings are cached for the configured TTL; a
/// zero TTL disables caching.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Option<Cache<CacheKey, CacheValue>>,
    /// Bumped by every invalidation; a listing fetched under an older
    /// generation is not cached.
    catalog_generation: AtomicU64,
}

impl ApiClient {
    /// Create a new API client.
    #[must_use]
    pub fn new(mut base_url: Url, cache_ttl: Duration) -> Self {
        // Relative joins only keep the last path segment with a trailing slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let cache = (!cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(cache_ttl)
                .build()
        });

        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                base_url,
                cache,
                catalog_generation: AtomicU64::new(0),
            }),
        }
    }

    /// The API base URL (always ends in `/`).
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Resolve an endpoint path against the base URL.
    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Send a request and decode the JSON response.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let body = Self::execute(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse marketplace API response"
            );
            ApiError::Parse(e)
        })
    }

    /// Send a request whose response body is not needed.
    async fn send_empty(&self, request: RequestBuilder) -> Result<(), ApiError> {
        Self::execute(request).await.map(drop)
    }

    /// Send a request and return the body of a successful response.
    async fn execute(request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let err = ApiError::from_response(status, &body);
        if status.is_server_error() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Marketplace API returned server error"
            );
        } else {
            debug!(status = %status, detail = ?err.detail(), "Marketplace API rejected request");
        }
        Err(err)
    }

    fn get(&self, url: Url) -> RequestBuilder {
        self.inner.client.get(url)
    }

    fn authed(&self, method: reqwest::Method, url: Url, token: &SecretString) -> RequestBuilder {
        self.inner
            .client
            .request(method, url)
            .bearer_auth(token.expose_secret())
    }

    async fn cached(&self, key: &CacheKey) -> Option<CacheValue> {
        match &self.inner.cache {
            Some(cache) => cache.get(key).await,
            None => None,
        }
    }

    fn catalog_generation(&self) -> u64 {
        self.inner.catalog_generation.load(Ordering::Acquire)
    }

    /// Cache a listing fetched while `generation` was current.
    ///
    /// Skipped when the catalog was invalidated during the fetch. An
    /// invalidation racing the insert removes the entry again.
    async fn remember(&self, key: CacheKey, value: CacheValue, generation: u64) {
        let Some(cache) = &self.inner.cache else {
            return;
        };
        if self.catalog_generation() != generation {
            debug!(?key, "Catalog changed during fetch, not caching");
            return;
        }
        cache.insert(key, value).await;
        if self.catalog_generation() != generation {
            cache.invalidate(&key).await;
        }
    }

    /// Drop every cached listing.
    pub fn invalidate_catalog(&self) {
        self.inner
            .catalog_generation
            .fetch_add(1, Ordering::AcqRel);
        if let Some(cache) = &self.inner.cache {
            cache.invalidate_all();
        }
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for wrong credentials, or an error if
    /// the request fails.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Token, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let request = self.inner.client.post(self.url("auth/login")?).json(&body);
        self.send(request).await
    }

    /// Create a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the registration (duplicate email
    /// or username) or the request fails.
    #[instrument(skip(self, request), fields(email = %request.email, username = %request.username))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, ApiError> {
        let request = self.inner.client.post(self.url("auth/register")?).json(request);
        self.send(request).await
    }

    /// Fetch the user that owns `token`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` if the token is invalid or expired.
    #[instrument(skip_all)]
    pub async fn me(&self, token: &SecretString) -> Result<User, ApiError> {
        let request = self.authed(reqwest::Method::GET, self.url("auth/me")?, token);
        self.send(request).await
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        let key = CacheKey::Categories;
        if let Some(CacheValue::Categories(categories)) = self.cached(&key).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let generation = self.catalog_generation();
        let categories: Vec<Category> = self.send(self.get(self.url("categories")?)).await?;
        self.remember(key, CacheValue::Categories(categories.clone()), generation)
            .await;
        Ok(categories)
    }

    /// Create a category (admin only).
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the request or it fails.
    #[instrument(skip(self, token, category), fields(name = %category.name))]
    pub async fn create_category(
        &self,
        token: &SecretString,
        category: &NewCategory,
    ) -> Result<Category, ApiError> {
        let request = self
            .authed(reqwest::Method::POST, self.url("categories")?, token)
            .json(category);
        let created = self.send(request).await?;
        self.invalidate_catalog();
        Ok(created)
    }

    /// Delete a category (admin only).
    ///
    /// # Errors
    ///
    /// Returns an error if the category does not exist or the request fails.
    #[instrument(skip(self, token))]
    pub async fn delete_category(&self, token: &SecretString, id: CategoryId) -> Result<(), ApiError> {
        let url = self.url(&format!("categories/{id}"))?;
        self.send_empty(self.authed(reqwest::Method::DELETE, url, token))
            .await?;
        self.invalidate_catalog();
        Ok(())
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List products, optionally filtered by category or limited in count.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: ProductQuery) -> Result<Vec<Product>, ApiError> {
        let key = CacheKey::Products(query);
        if let Some(CacheValue::Products(products)) = self.cached(&key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let mut url = self.url("products")?;
        let pairs = query.pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        let generation = self.catalog_generation();
        let products: Vec<Product> = self.send(self.get(url)).await?;
        self.remember(key, CacheValue::Products(products.clone()), generation)
            .await;
        Ok(products)
    }

    /// Create a product (admin only).
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the request or it fails.
    #[instrument(skip(self, token, product), fields(name = %product.name))]
    pub async fn create_product(
        &self,
        token: &SecretString,
        product: &NewProduct,
    ) -> Result<Product, ApiError> {
        let request = self
            .authed(reqwest::Method::POST, self.url("products")?, token)
            .json(product);
        let created = self.send(request).await?;
        self.invalidate_catalog();
        Ok(created)
    }

    /// Delete a product (admin only).
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the request fails.
    #[instrument(skip(self, token))]
    pub async fn delete_product(&self, token: &SecretString, id: ProductId) -> Result<(), ApiError> {
        let url = self.url(&format!("products/{id}"))?;
        self.send_empty(self.authed(reqwest::Method::DELETE, url, token))
            .await?;
        self.invalidate_catalog();
        Ok(())
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Fetch the caller's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip_all)]
    pub async fn get_cart(&self, token: &SecretString) -> Result<Vec<CartItem>, ApiError> {
        let request = self.authed(reqwest::Method::GET, self.url("cart")?, token);
        self.send(request).await
    }

    /// Add a product to the caller's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is unavailable, the token is rejected
    /// or the request fails.
    #[instrument(skip(self, token))]
    pub async fn add_to_cart(
        &self,
        token: &SecretString,
        item: NewCartItem,
    ) -> Result<CartItem, ApiError> {
        let request = self
            .authed(reqwest::Method::POST, self.url("cart")?, token)
            .json(&item);
        self.send(request).await
    }

    /// Set the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line does not exist, the token is rejected or
    /// the request fails.
    #[instrument(skip(self, token))]
    pub async fn update_cart_item(
        &self,
        token: &SecretString,
        id: CartItemId,
        quantity: u32,
    ) -> Result<CartItem, ApiError> {
        let request = self
            .authed(reqwest::Method::PUT, self.url(&format!("cart/{id}"))?, token)
            .json(&CartItemUpdate { quantity });
        self.send(request).await
    }

    /// Remove a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line does not exist, the token is rejected or
    /// the request fails.
    #[instrument(skip(self, token))]
    pub async fn remove_cart_item(&self, token: &SecretString, id: CartItemId) -> Result<(), ApiError> {
        let url = self.url(&format!("cart/{id}"))?;
        self.send_empty(self.authed(reqwest::Method::DELETE, url, token))
            .await
    }

    /// Remove every line from the caller's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip_all)]
    pub async fn clear_cart(&self, token: &SecretString) -> Result<(), ApiError> {
        let request = self.authed(reqwest::Method::DELETE, self.url("cart")?, token);
        self.send_empty(request).await
    }

    // =========================================================================
    // Health
    // =========================================================================

    /// Whether the API answers its health check with a 2xx.
    #[instrument(skip(self))]
    pub async fn health(&self) -> bool {
        let url = match self.url("health") {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid health check URL");
                return false;
            }
        };
        match self.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::warn!(error = %e, "Marketplace API health check failed");
                false
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(Url::parse(base).unwrap(), Duration::ZERO)
    }

    #[tokio::test]
    async fn test_listing_fetched_across_invalidation_is_not_cached() {
        let api = ApiClient::new(
            Url::parse("http://localhost:8000").unwrap(),
            Duration::from_secs(60),
        );

        let current = api.catalog_generation();
        api.remember(CacheKey::Categories, CacheValue::Categories(Vec::new()), current)
            .await;
        assert!(api.cached(&CacheKey::Categories).await.is_some());

        // A fetch starts, then a mutation invalidates before it completes
        let stale = api.catalog_generation();
        api.invalidate_catalog();
        api.remember(CacheKey::Categories, CacheValue::Categories(Vec::new()), stale)
            .await;
        assert!(api.cached(&CacheKey::Categories).await.is_none());

        let key = CacheKey::Products(ProductQuery::all());
        api.remember(key, CacheValue::Products(Vec::new()), stale)
            .await;
        assert!(api.cached(&key).await.is_none());

        api.remember(key, CacheValue::Products(Vec::new()), api.catalog_generation())
            .await;
        assert!(api.cached(&key).await.is_some());
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        assert_eq!(
            client("https://api.toys.example/v1").base_url().as_str(),
            "https://api.toys.example/v1/"
        );
        assert_eq!(
            client("http://localhost:8000").base_url().as_str(),
            "http://localhost:8000/"
        );
    }

    #[test]
    fn test_url_keeps_base_path() {
        let api = client("https://api.toys.example/v1");
        assert_eq!(
            api.url("products").unwrap().as_str(),
            "https://api.toys.example/v1/products"
        );
        assert_eq!(
            api.url("/cart/7").unwrap().as_str(),
            "https://api.toys.example/v1/cart/7"
        );
    }

    #[test]
    fn test_zero_ttl_disables_cache() {
        assert!(client("http://localhost:8000").inner.cache.is_none());
        let api = ApiClient::new(Url::parse("http://localhost:8000").unwrap(), Duration::from_secs(60));
        assert!(api.inner.cache.is_some());
    }

    #[tokio::test]
    async fn test_invalidate_catalog_empties_cache() {
        let api = ApiClient::new(Url::parse("http://localhost:8000").unwrap(), Duration::from_secs(60));
        api.remember(
            CacheKey::Categories,
            CacheValue::Categories(Vec::new()),
            api.catalog_generation(),
        )
        .await;
        assert!(api.cached(&CacheKey::Categories).await.is_some());

        api.invalidate_catalog();
        assert!(api.cached(&CacheKey::Categories).await.is_none());
    }

    #[tokio::test]
    async fn test_health_false_when_unreachable() {
        // Port 9 (discard) is not expected to serve HTTP
        let api = client("http://127.0.0.1:9");
        assert!(!api.health().await);
    }
}
