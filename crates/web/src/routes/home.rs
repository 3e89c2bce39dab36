//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use toys_marketplace_core::{Category, Product, ProductQuery};

use crate::filters;
use crate::layout::Layout;
use crate::middleware::{ClientSession, CspNonce};
use crate::state::AppState;

/// Categories shown in the "Shop by Category" grid.
const HOME_CATEGORY_COUNT: usize = 4;

/// Products shown in the "Featured Products" grid.
const HOME_PRODUCT_COUNT: u32 = 6;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    /// Where add-to-cart forms send the visitor back to.
    pub return_to: String,
}

/// Display the home page.
///
/// Either grid falls back to its empty state when the API call fails.
#[instrument(skip(state, client, nonce))]
pub async fn home(
    State(state): State<AppState>,
    mut client: ClientSession,
    nonce: CspNonce,
) -> impl IntoResponse {
    let api = state.api();
    let (categories, products) = tokio::join!(
        api.list_categories(),
        api.list_products(ProductQuery::first(HOME_PRODUCT_COUNT))
    );

    let categories = client.check(categories).await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load home categories");
        Vec::new()
    });
    let products = client.check(products).await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load featured products");
        Vec::new()
    });

    HomeTemplate {
        layout: Layout::build(&client, nonce, "/").await,
        categories: categories.into_iter().take(HOME_CATEGORY_COUNT).collect(),
        products,
        return_to: "/".to_string(),
    }
}
