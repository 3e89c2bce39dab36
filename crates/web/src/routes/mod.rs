//! HTTP route handlers for the web client.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                              - Home page
//! GET  /products                      - Product listing (?category=<id>&q=<term>)
//!
//! # Auth
//! GET  /login                         - Login page
//! POST /login                         - Login action (rate limited)
//! GET  /register                      - Register page
//! POST /register                      - Register action (rate limited)
//! POST /logout                        - Logout action
//!
//! # Cart (requires auth, except add which toasts instead)
//! GET  /cart                          - Cart page
//! POST /cart/add                      - Add product
//! POST /cart/{item_id}/quantity       - Step quantity by +/-1
//! POST /cart/{item_id}/remove         - Remove line
//! POST /cart/clear                    - Remove every line
//! POST /cart/checkout                 - "Coming soon" toast
//!
//! # Profile (requires auth)
//! GET  /profile                       - Profile page (?tab=profile|security)
//!
//! # Admin (requires admin)
//! GET  /admin                         - Dashboard (?tab=...&modal=...)
//! POST /admin/categories              - Create category
//! POST /admin/categories/{id}/delete  - Delete category
//! POST /admin/products                - Create product
//! POST /admin/products/{id}/delete    - Delete product
//! ```
//!
//! Health checks, static files and the catch-all redirect are mounted in
//! [`crate::build_router`].

pub mod admin;
pub mod auth;
pub mod cart;
pub mod home;
pub mod products;
pub mod profile;

use axum::{
    Router,
    handler::Handler,
    routing::{get, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
///
/// Only the form submissions are rate limited, each with its own budget.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            get(auth::login_page).post(auth::login.layer(auth_rate_limiter())),
        )
        .route(
            "/register",
            get(auth::register_page).post(auth::register.layer(auth_rate_limiter())),
        )
        .route("/logout", post(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/{item_id}/quantity", post(cart::update_quantity))
        .route("/{item_id}/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/checkout", post(cart::checkout))
}

/// Create the admin dashboard routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::dashboard))
        .route("/categories", post(admin::create_category))
        .route("/categories/{id}/delete", post(admin::delete_category))
        .route("/products", post(admin::create_product))
        .route("/products/{id}/delete", post(admin::delete_product))
}

/// Create all page routes for the web client.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/products", get(products::index))
        .route("/profile", get(profile::show))
        .merge(auth_routes())
        .nest("/cart", cart_routes())
        .nest("/admin", admin_routes())
}
