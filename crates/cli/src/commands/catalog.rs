//! Catalog listing.

use toys_marketplace_core::ProductQuery;
use toys_marketplace_web::api::{ApiClient, ApiError};

/// Log every category followed by the products filed under it.
///
/// # Errors
///
/// Returns an error if either listing request fails.
pub async fn list(api: &ApiClient) -> Result<(), ApiError> {
    let (categories, products) =
        tokio::join!(api.list_categories(), api.list_products(ProductQuery::all()));
    let (categories, products) = (categories?, products?);

    tracing::info!(
        "{} categories, {} products",
        categories.len(),
        products.len()
    );

    for category in &categories {
        let status = if category.is_active { "" } else { " (inactive)" };
        tracing::info!("[{}] {}{status}", category.id, category.name);

        for product in products.iter().filter(|p| p.category_id == category.id) {
            let featured = if product.is_featured { " *" } else { "" };
            tracing::info!(
                "    [{}] {} - {} ({} in stock){featured}",
                product.id,
                product.name,
                product.price,
                product.stock_quantity
            );
        }
    }

    Ok(())
}
