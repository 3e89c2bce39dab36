//! Integration tests for the Toys Marketplace web client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p toys-marketplace-integration-tests
//! ```
//!
//! Nothing external is needed: each test starts a [`StubApi`] (an in-memory
//! marketplace API on an ephemeral port) and, through [`TestApp`], the real
//! web router pointed at it. Requests go through a cookie-enabled `reqwest`
//! client that does not follow redirects, so every post/redirect/get hop
//! can be asserted.
//!
//! # Test Files
//!
//! - `api_client` - `ApiClient` against the stub, including the catalog cache
//! - `auth_flow` - Login, registration, logout and the profile page
//! - `cart_flow` - Cart mutations, toasts and 401 session teardown
//! - `catalog_flow` - Product listing category and search filters
//! - `admin_flow` - Dashboard guard, modal forms and deletes
//! - `session_store` - Session records released once emptied

pub mod stub_api;

use std::net::SocketAddr;

use reqwest::{Response, StatusCode};
use tokio::net::TcpListener;
use tower_sessions::SessionStore;
use tower_sessions::session::Id;

use toys_marketplace_web::build_router;
use toys_marketplace_web::config::WebConfig;
use toys_marketplace_web::middleware::SESSION_COOKIE_NAME;
use toys_marketplace_web::state::AppState;

pub use stub_api::{
    ADMIN_EMAIL, ADMIN_PASSWORD, HERO_FIGURE, ROBOT_DOG, StubApi, TEDDY_BEAR, USER_EMAIL,
    USER_PASSWORD,
};

/// The web client running against a fresh stub API.
pub struct TestApp {
    pub api: StubApi,
    pub state: AppState,
    pub addr: SocketAddr,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Start a stub API and a web client wired to it.
    ///
    /// The catalog cache is disabled so every page sees the stub's current
    /// data.
    ///
    /// # Panics
    ///
    /// Panics if either server cannot be started.
    pub async fn spawn() -> Self {
        let api = StubApi::spawn().await;
        let api_url = api.url.to_string();
        let config = WebConfig::from_lookup(|key| match key {
            "MARKETPLACE_API_URL" => Some(api_url.clone()),
            "CATALOG_CACHE_TTL_SECS" => Some("0".to_string()),
            _ => None,
        })
        .expect("test configuration");

        let state = AppState::new(config);
        let app = build_router(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind web client listener");
        let addr = listener.local_addr().expect("web client address");
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("web client server");
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("http client");

        Self {
            api,
            state,
            addr,
            client,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .unwrap_or_else(|e| panic!("GET {path}: {e}"))
    }

    /// Submit an HTML form.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .unwrap_or_else(|e| panic!("POST {path}: {e}"))
    }

    /// GET a page that must render, returning its HTML.
    ///
    /// # Panics
    ///
    /// Panics unless the response is a 200.
    pub async fn page(&self, path: &str) -> String {
        let response = self.get(path).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {path}");
        response.text().await.expect("page body")
    }

    /// Submit the login form.
    pub async fn login(&self, email: &str, password: &str) -> Response {
        self.post_form("/login", &[("email", email), ("password", password)])
            .await
    }

    /// Sign in as the seeded admin.
    ///
    /// # Panics
    ///
    /// Panics if the login is not accepted.
    pub async fn login_admin(&self) {
        let response = self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
        assert_eq!(location(&response).as_deref(), Some("/"), "admin login");
    }

    /// Sign in as the seeded customer.
    ///
    /// # Panics
    ///
    /// Panics if the login is not accepted.
    pub async fn login_user(&self) {
        let response = self.login(USER_EMAIL, USER_PASSWORD).await;
        assert_eq!(location(&response).as_deref(), Some("/"), "user login");
    }

    /// Whether the session store still holds a record for `id`.
    ///
    /// # Panics
    ///
    /// Panics if the store cannot be read.
    pub async fn has_session(&self, id: &Id) -> bool {
        self.state
            .sessions()
            .load(id)
            .await
            .expect("session store")
            .is_some()
    }
}

/// Target of a redirect response, if it is one.
#[must_use]
pub fn location(response: &Response) -> Option<String> {
    if !response.status().is_redirection() {
        return None;
    }
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(String::from)
}

/// Session id a response set in its cookie, if any.
#[must_use]
pub fn session_id(response: &Response) -> Option<Id> {
    let prefix = format!("{SESSION_COOKIE_NAME}=");
    response
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|cookie| cookie.strip_prefix(prefix.as_str()))
        .filter_map(|rest| rest.split(';').next())
        .find_map(|value| value.parse().ok())
}
