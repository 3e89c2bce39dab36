//! `ApiClient` against the stub marketplace API.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::time::Duration;

use reqwest::StatusCode;
use secrecy::SecretString;
use toys_marketplace_core::{
    CategoryId, NewCartItem, NewCategory, ProductId, ProductQuery, RegisterRequest,
};
use toys_marketplace_integration_tests::{
    ADMIN_EMAIL, ADMIN_PASSWORD, HERO_FIGURE, ROBOT_DOG, StubApi, USER_EMAIL, USER_PASSWORD,
};
use toys_marketplace_web::api::{ApiClient, ApiError};
use url::Url;

fn client(api: &StubApi, ttl: Duration) -> ApiClient {
    ApiClient::new(api.url.clone(), ttl)
}

async fn token(api: &ApiClient, email: &str, password: &str) -> SecretString {
    SecretString::from(api.login(email, password).await.unwrap().access_token)
}

fn new_category(name: &str) -> NewCategory {
    NewCategory {
        name: name.to_string(),
        description: None,
        image_url: None,
    }
}

// =============================================================================
// Auth
// =============================================================================

#[tokio::test]
async fn test_login_and_me() {
    let stub = StubApi::spawn().await;
    let api = client(&stub, Duration::ZERO);

    let token = token(&api, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let me = api.me(&token).await.unwrap();
    assert_eq!(me.username, "admin");
    assert!(me.is_admin);
    assert_eq!(me.display_name(), "Admin User");
}

#[tokio::test]
async fn test_wrong_credentials_are_unauthorized() {
    let stub = StubApi::spawn().await;
    let api = client(&stub, Duration::ZERO);

    let err = api.login(ADMIN_EMAIL, "nope").await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.user_message("Login failed"), "Incorrect email or password");

    let err = api.me(&SecretString::from("bogus")).await.unwrap_err();
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_register_conflict_detail() {
    let stub = StubApi::spawn().await;
    let api = client(&stub, Duration::ZERO);

    let request = RegisterRequest {
        email: USER_EMAIL.parse().unwrap(),
        username: "another".to_string(),
        full_name: None,
        password: "secret1".to_string(),
    };
    let err = api.register(&request).await.unwrap_err();
    match err {
        ApiError::Status { status, ref detail } => {
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(detail.as_deref(), Some("Email already registered"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_product_query_filters() {
    let stub = StubApi::spawn().await;
    let api = client(&stub, Duration::ZERO);

    let all = api.list_products(ProductQuery::all()).await.unwrap();
    assert_eq!(all.len(), 3);

    let figures = api
        .list_products(ProductQuery::in_category(CategoryId::new(1)))
        .await
        .unwrap();
    let names: Vec<_> = figures.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Hero Figure", "Robot Dog"]);

    let first = api.list_products(ProductQuery::first(1)).await.unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].category.name, "Action Figures");
    assert_eq!(first[0].seller.username, "admin");
}

#[tokio::test]
async fn test_catalog_cache_and_invalidation() {
    let stub = StubApi::spawn().await;
    let api = client(&stub, Duration::from_secs(60));

    api.list_categories().await.unwrap();
    api.list_categories().await.unwrap();
    assert_eq!(stub.state.request_count("GET /categories"), 1);

    let admin = token(&api, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    api.create_category(&admin, &new_category("Kites"))
        .await
        .unwrap();

    let categories = api.list_categories().await.unwrap();
    assert_eq!(stub.state.request_count("GET /categories"), 2);
    assert!(categories.iter().any(|c| c.name == "Kites"));
}

#[tokio::test]
async fn test_zero_ttl_disables_cache() {
    let stub = StubApi::spawn().await;
    let api = client(&stub, Duration::ZERO);

    api.list_products(ProductQuery::all()).await.unwrap();
    api.list_products(ProductQuery::all()).await.unwrap();
    assert_eq!(stub.state.request_count("GET /products"), 2);
}

#[tokio::test]
async fn test_customer_cannot_mutate_catalog() {
    let stub = StubApi::spawn().await;
    let api = client(&stub, Duration::ZERO);
    let customer = token(&api, USER_EMAIL, USER_PASSWORD).await;

    let err = api
        .create_category(&customer, &new_category("Kites"))
        .await
        .unwrap_err();
    assert!(!err.is_unauthorized());
    assert_eq!(err.user_message("Failed to add category"), "Not enough permissions");

    let err = api
        .delete_product(&customer, ProductId::new(HERO_FIGURE))
        .await
        .unwrap_err();
    assert_eq!(err.detail(), Some("Not enough permissions"));
}

#[tokio::test]
async fn test_server_error_without_detail_uses_fallback() {
    let stub = StubApi::spawn().await;
    let api = client(&stub, Duration::ZERO);
    stub.state.set_catalog_down(true);

    let err = api.list_categories().await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Status { status, detail: None } if status == StatusCode::INTERNAL_SERVER_ERROR
    ));
    assert_eq!(err.user_message("Failed to load categories"), "Failed to load categories");
}

// =============================================================================
// Cart
// =============================================================================

#[tokio::test]
async fn test_cart_lifecycle() {
    let stub = StubApi::spawn().await;
    let api = client(&stub, Duration::ZERO);
    let customer = token(&api, USER_EMAIL, USER_PASSWORD).await;

    let hero = ProductId::new(HERO_FIGURE);
    api.add_to_cart(&customer, NewCartItem::one(hero)).await.unwrap();
    let line = api
        .add_to_cart(&customer, NewCartItem::one(hero))
        .await
        .unwrap();
    assert_eq!(line.quantity, 2, "adding again merges into one line");

    api.add_to_cart(&customer, NewCartItem::one(ProductId::new(ROBOT_DOG)))
        .await
        .unwrap();
    assert_eq!(api.get_cart(&customer).await.unwrap().len(), 2);

    let updated = api.update_cart_item(&customer, line.id, 4).await.unwrap();
    assert_eq!(updated.quantity, 4);

    let err = api
        .update_cart_item(&customer, line.id, 99)
        .await
        .unwrap_err();
    assert_eq!(err.detail(), Some("Not enough stock available"));

    api.remove_cart_item(&customer, line.id).await.unwrap();
    assert_eq!(api.get_cart(&customer).await.unwrap().len(), 1);

    api.clear_cart(&customer).await.unwrap();
    assert!(api.get_cart(&customer).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cart_requires_token() {
    let stub = StubApi::spawn().await;
    let api = client(&stub, Duration::ZERO);

    let err = api.get_cart(&SecretString::from("expired")).await.unwrap_err();
    assert!(err.is_unauthorized());
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health() {
    let stub = StubApi::spawn().await;
    assert!(client(&stub, Duration::ZERO).health().await);

    let unreachable = ApiClient::new(Url::parse("http://127.0.0.1:9").unwrap(), Duration::ZERO);
    assert!(!unreachable.health().await);
}
