//! Toys Marketplace web client library.
//!
//! The binary in `main.rs` only loads configuration, installs tracing and
//! Sentry, and serves [`build_router`]. Everything else lives here so the
//! router can be driven in tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod filters;
pub mod layout;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn,
    response::Redirect,
    routing::get,
};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{
    create_session_layer, csp_nonce_middleware, request_id_middleware,
    security_headers_middleware,
};
use crate::state::AppState;

/// Directory served under `/static`.
pub const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Build the full application router, middleware included (Sentry layers
/// excepted, which the binary adds outermost).
pub fn build_router(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config(), state.sessions().clone());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .fallback(fallback)
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(csp_nonce_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the API.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the marketplace API is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.api().health().await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Unknown paths go home.
async fn fallback() -> Redirect {
    Redirect::to("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use tower::ServiceExt;
    use url::Url;

    use super::*;
    use crate::config::WebConfig;

    /// Router pointed at a port nothing listens on.
    fn router() -> Router {
        let config = WebConfig::from_lookup(|key| {
            (key == "MARKETPLACE_API_URL").then(|| "http://127.0.0.1:9".to_string())
        })
        .unwrap();
        let api = api::ApiClient::new(Url::parse("http://127.0.0.1:9").unwrap(), Duration::ZERO);
        build_router(AppState::with_api(config, api))
    }

    async fn get(uri: &str) -> axum::response::Response {
        router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    fn location(response: &axum::response::Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_health() {
        let response = get("/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn test_readiness_fails_without_api() {
        let response = get("/health/ready").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_unknown_path_redirects_home() {
        let response = get("/does/not/exist").await;
        assert!(response.status().is_redirection());
        assert_eq!(location(&response), "/");
    }

    #[tokio::test]
    async fn test_guards_redirect_anonymous_visitors() {
        assert_eq!(location(&get("/cart").await), "/login");
        assert_eq!(location(&get("/profile").await), "/login");
        assert_eq!(location(&get("/admin").await), "/");
    }

    #[tokio::test]
    async fn test_pages_render_when_api_is_down() {
        for uri in ["/", "/products", "/products?category=2&q=bear", "/login", "/register"] {
            let response = get(uri).await;
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_security_headers_and_request_id() {
        let response = get("/login").await;
        let headers = response.headers();
        assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
        assert!(headers.get("x-request-id").is_some());
        let csp = headers
            .get(header::CONTENT_SECURITY_POLICY)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(csp.contains("'nonce-"));
    }

    #[tokio::test]
    async fn test_login_page_has_form() {
        let response = get("/login").await;
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains(r#"action="/login""#));
        assert!(html.contains("Sign in to your account"));
    }
}
