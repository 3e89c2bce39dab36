//! Admin dashboard: access guard, modal forms and deletes.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use toys_marketplace_integration_tests::{HERO_FIGURE, TestApp, location};

// =============================================================================
// Access
// =============================================================================

#[tokio::test]
async fn test_dashboard_is_admin_only() {
    let app = TestApp::spawn().await;
    assert_eq!(location(&app.get("/admin").await).as_deref(), Some("/"));

    app.login_user().await;
    assert_eq!(location(&app.get("/admin").await).as_deref(), Some("/"));

    let response = app
        .post_form("/admin/categories", &[("name", "Sneaky")])
        .await;
    assert_eq!(location(&response).as_deref(), Some("/"));
    assert_eq!(app.api.state.request_count("POST /categories"), 0);
}

#[tokio::test]
async fn test_dashboard_stats_and_tabs() {
    let app = TestApp::spawn().await;
    app.login_admin().await;

    let overview = app.page("/admin").await;
    assert!(overview.contains("Admin Dashboard"));
    assert!(overview.contains(r#"<p class="stat-value">3</p>"#));
    assert!(overview.contains(r#"<p class="stat-value">2</p>"#));
    assert!(overview.contains("No recent activity to display."));

    let categories = app.page("/admin?tab=categories").await;
    assert!(categories.contains("Plush Toys"));
    assert!(categories.contains("No description"));

    let products = app.page("/admin?tab=products").await;
    assert!(products.contains("Robot Dog"));
    assert!(products.contains("10 in stock"));
    assert!(!products.contains(r#"role="dialog""#));
}

#[tokio::test]
async fn test_dashboard_survives_api_outage() {
    let app = TestApp::spawn().await;
    app.login_admin().await;
    app.api.state.set_catalog_down(true);

    let body = app.page("/admin?tab=products&modal=add-product").await;
    assert!(body.contains("Failed to load dashboard data"));
    assert!(body.contains("Failed to load categories"));
    assert!(body.contains(r#"<p class="stat-value">0</p>"#));
}

// =============================================================================
// Add Category
// =============================================================================

#[tokio::test]
async fn test_modal_opens_from_query() {
    let app = TestApp::spawn().await;
    app.login_admin().await;

    let body = app.page("/admin?tab=categories&modal=add-category").await;
    assert!(body.contains("Add New Category"));
    assert!(body.contains(r#"href="/admin?tab=categories""#));
}

#[tokio::test]
async fn test_create_category() {
    let app = TestApp::spawn().await;
    app.login_admin().await;

    let response = app
        .post_form(
            "/admin/categories",
            &[("name", "  Board Games "), ("description", "Family games"), ("image_url", "")],
        )
        .await;
    assert_eq!(location(&response).as_deref(), Some("/admin?tab=categories"));
    assert!(app.api.state.category_names().contains(&"Board Games".to_string()));

    let body = app.page("/admin?tab=categories").await;
    assert!(body.contains("Category added successfully!"));
    assert!(body.contains("Family games"));
}

#[tokio::test]
async fn test_blank_category_keeps_modal_open() {
    let app = TestApp::spawn().await;
    app.login_admin().await;

    let response = app
        .post_form("/admin/categories", &[("name", " "), ("description", "Kept")])
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.text().await.unwrap();
    assert!(body.contains("Category name is required"));
    assert!(body.contains("Add New Category"));
    assert!(body.contains(">Kept</textarea>"));
    assert_eq!(app.api.state.request_count("POST /categories"), 0);
}

#[tokio::test]
async fn test_duplicate_category_shows_api_detail() {
    let app = TestApp::spawn().await;
    app.login_admin().await;

    let body = app
        .post_form("/admin/categories", &[("name", "Action Figures")])
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("Category already exists"));
    assert!(body.contains("Add New Category"));
}

// =============================================================================
// Add Product
// =============================================================================

#[tokio::test]
async fn test_create_product() {
    let app = TestApp::spawn().await;
    app.login_admin().await;

    let response = app
        .post_form(
            "/admin/products",
            &[
                ("name", "Box Kite"),
                ("description", "Flies in light wind"),
                ("price", "12.50"),
                ("stock_quantity", "7"),
                ("category_id", "1"),
                ("image_url", "https://example.com/kite.jpg"),
                ("is_featured", "on"),
            ],
        )
        .await;
    assert_eq!(location(&response).as_deref(), Some("/admin?tab=products"));
    assert!(app.api.state.product_names().contains(&"Box Kite".to_string()));

    let products = app.page("/products?category=1").await;
    assert!(products.contains("Box Kite"));
    assert!(products.contains("$12.50"));
    assert!(products.contains("7 in stock"));
}

#[tokio::test]
async fn test_invalid_price_keeps_values() {
    let app = TestApp::spawn().await;
    app.login_admin().await;

    let body = app
        .post_form(
            "/admin/products",
            &[
                ("name", "Box Kite"),
                ("price", "cheap"),
                ("stock_quantity", "7"),
                ("category_id", "2"),
            ],
        )
        .await
        .text()
        .await
        .unwrap();

    assert!(body.contains("Valid price is required"));
    assert!(body.contains("Add New Product"));
    assert!(body.contains(r#"value="Box Kite""#));
    assert!(body.contains(r#"<option value="2" selected>Plush Toys</option>"#));
    assert_eq!(app.api.state.request_count("POST /products"), 0);
}

// =============================================================================
// Deletes
// =============================================================================

#[tokio::test]
async fn test_delete_product() {
    let app = TestApp::spawn().await;
    app.login_admin().await;

    let response = app
        .post_form(&format!("/admin/products/{HERO_FIGURE}/delete"), &[])
        .await;
    assert_eq!(location(&response).as_deref(), Some("/admin?tab=products"));
    assert!(!app.api.state.product_names().contains(&"Hero Figure".to_string()));

    let body = app.page("/admin?tab=products").await;
    assert!(body.contains("Product deleted successfully"));
    assert!(body.contains(r#"<p class="stat-value">2</p>"#));
}

#[tokio::test]
async fn test_delete_missing_category() {
    let app = TestApp::spawn().await;
    app.login_admin().await;

    let response = app.post_form("/admin/categories/999/delete", &[]).await;
    assert_eq!(location(&response).as_deref(), Some("/admin?tab=categories"));
    assert!(app.page("/admin?tab=categories").await.contains("Failed to delete category"));
}
