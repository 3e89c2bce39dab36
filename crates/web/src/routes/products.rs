//! Product listing route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use toys_marketplace_core::catalog::filter_products;
use toys_marketplace_core::{Category, CategoryId, Product, ProductQuery};

use crate::filters;
use crate::layout::Layout;
use crate::middleware::{ClientSession, CspNonce};
use crate::state::AppState;

/// Listing filters from the query string.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    /// Category ID; empty or unparseable means all categories.
    pub category: Option<String>,
    /// Search term matched against name and description.
    pub q: Option<String>,
}

impl ListingQuery {
    fn category_id(&self) -> Option<CategoryId> {
        self.category.as_deref().and_then(|id| id.parse().ok())
    }

    fn term(&self) -> &str {
        self.q.as_deref().map_or("", str::trim)
    }

    /// The listing URL for these filters, used as the add-to-cart return
    /// target.
    fn path(&self) -> String {
        let mut pairs = Vec::new();
        if let Some(id) = self.category_id() {
            pairs.push(format!("category={id}"));
        }
        if !self.term().is_empty() {
            pairs.push(format!("q={}", urlencoding::encode(self.term())));
        }
        if pairs.is_empty() {
            "/products".to_string()
        } else {
            format!("/products?{}", pairs.join("&"))
        }
    }
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products.html")]
pub struct ProductsTemplate {
    pub layout: Layout,
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub selected_category: Option<CategoryId>,
    pub search: String,
    pub return_to: String,
}

impl ProductsTemplate {
    /// Whether `id` is the category picked in the dropdown.
    ///
    /// Takes a reference because template loops bind their items by
    /// reference.
    #[must_use]
    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn is_selected(&self, id: &CategoryId) -> bool {
        self.selected_category.as_ref() == Some(id)
    }
}

/// Display the product listing.
///
/// The category filter is applied by the API; the search term is applied
/// here over the fetched list.
#[instrument(skip(state, client, nonce))]
pub async fn index(
    State(state): State<AppState>,
    mut client: ClientSession,
    nonce: CspNonce,
    Query(query): Query<ListingQuery>,
) -> impl IntoResponse {
    let selected_category = query.category_id();
    let product_query = selected_category.map_or_else(ProductQuery::all, ProductQuery::in_category);

    let api = state.api();
    let (categories, products) = tokio::join!(
        api.list_categories(),
        api.list_products(product_query)
    );

    let categories = client.check(categories).await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load categories");
        Vec::new()
    });
    let products = client.check(products).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to load products");
        Vec::new()
    });

    let term = query.term();
    let products = filter_products(&products, term).into_iter().cloned().collect();

    ProductsTemplate {
        layout: Layout::build(&client, nonce, "/products")
            .await
            .with_search(term),
        categories,
        products,
        selected_category,
        search: term.to_string(),
        return_to: query.path(),
    }
}
