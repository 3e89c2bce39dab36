//! HTTP middleware stack for the web client.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, error capture)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded on the span and Sentry scope)
//! 4. CSP nonce (per-request nonce for the inline bootstrap script)
//! 5. Security headers (CSP built from the nonce, frame and sniffing guards)
//! 6. Session layer (tower-sessions, bounded moka store)
//! 7. Rate limiting on `POST /login` and `POST /register` (governor)

pub mod auth;
pub mod csp;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{ClientSession, RequireAdmin, RequireAuth, SignedIn};
pub use csp::{CspNonce, csp_nonce_middleware};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{SESSION_COOKIE_NAME, create_session_layer, create_session_store};
