//! Cart state: loading, mutations and the navbar badge.
//!
//! Every mutation reloads the cart afterwards so the badge matches the
//! API. A failed mutation leaves the cart untouched and queues a toast
//! with the server's `detail` (or a fixed fallback).

use toys_marketplace_core::cart::{CartItem, CartSummary, item_count, next_quantity};
use toys_marketplace_core::{CartItemId, NewCartItem, ProductId};

use crate::api::{ApiClient, ApiError};
use crate::error::add_breadcrumb;
use crate::middleware::ClientSession;

/// A loaded cart with its totals.
#[derive(Debug, Clone, Default)]
pub struct CartContents {
    pub items: Vec<CartItem>,
    pub summary: CartSummary,
}

impl CartContents {
    #[must_use]
    pub fn new(items: Vec<CartItem>) -> Self {
        let summary = CartSummary::from_items(&items);
        Self { items, summary }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Fetch the cart for the cart page.
///
/// Refreshes the badge on success. On failure toasts "Failed to load cart
/// items" and returns an empty cart.
pub async fn load(api: &ApiClient, client: &mut ClientSession) -> CartContents {
    let Some(token) = client.token().cloned() else {
        return CartContents::default();
    };

    match client.check(api.get_cart(&token).await).await {
        Ok(items) => {
            client.set_cart_count(item_count(&items)).await;
            CartContents::new(items)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load cart");
            client.error("Failed to load cart items").await;
            CartContents::default()
        }
    }
}

/// Re-read the cart and store its unit count for the navbar badge.
///
/// Failures are logged and the previous count is kept.
pub async fn refresh_count(api: &ApiClient, client: &mut ClientSession) {
    let Some(token) = client.token().cloned() else {
        return;
    };

    match client.check(api.get_cart(&token).await).await {
        Ok(items) => client.set_cart_count(item_count(&items)).await,
        Err(e) => tracing::warn!(error = %e, "Failed to refresh cart count"),
    }
}

/// Add `quantity` units of a product.
///
/// Anonymous visitors get a "Please log in" toast and no API call is made.
pub async fn add(
    api: &ApiClient,
    client: &mut ClientSession,
    product_id: ProductId,
    quantity: u32,
) {
    let Some(token) = client.token().cloned() else {
        client.error("Please log in to add items to cart").await;
        return;
    };

    let item = NewCartItem {
        product_id,
        quantity: quantity.max(1),
    };
    match client.check(api.add_to_cart(&token, item).await).await {
        Ok(_) => {
            refresh_count(api, client).await;
            let product_id = product_id.to_string();
            add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product_id.as_str())]));
            client.success("Added to cart!").await;
        }
        Err(e) => fail(client, &e, "Failed to add to cart").await,
    }
}

/// Move a line's quantity by `delta` from `current`.
///
/// A result below one unit is ignored without calling the API.
pub async fn update(
    api: &ApiClient,
    client: &mut ClientSession,
    item_id: CartItemId,
    current: u32,
    delta: i32,
) {
    let Some(quantity) = next_quantity(current, delta) else {
        tracing::debug!(%item_id, current, delta, "Ignoring quantity below one");
        return;
    };
    let Some(token) = client.token().cloned() else {
        return;
    };

    match client
        .check(api.update_cart_item(&token, item_id, quantity).await)
        .await
    {
        Ok(_) => {
            refresh_count(api, client).await;
            client.success("Cart updated!").await;
        }
        Err(e) => fail(client, &e, "Failed to update cart").await,
    }
}

/// Remove a line.
pub async fn remove(api: &ApiClient, client: &mut ClientSession, item_id: CartItemId) {
    let Some(token) = client.token().cloned() else {
        return;
    };

    match client
        .check(api.remove_cart_item(&token, item_id).await)
        .await
    {
        Ok(()) => {
            refresh_count(api, client).await;
            client.success("Item removed from cart").await;
        }
        Err(e) => fail(client, &e, "Failed to remove item").await,
    }
}

/// Remove every line.
pub async fn clear(api: &ApiClient, client: &mut ClientSession) {
    let Some(token) = client.token().cloned() else {
        return;
    };

    match client.check(api.clear_cart(&token).await).await {
        Ok(()) => {
            client.set_cart_count(0).await;
            client.success("Cart cleared").await;
        }
        Err(e) => fail(client, &e, "Failed to clear cart").await,
    }
}

/// Checkout is not available yet.
pub async fn checkout(client: &ClientSession) {
    client.success("Checkout functionality coming soon!").await;
}

async fn fail(client: &ClientSession, error: &ApiError, fallback: &str) {
    tracing::warn!(error = %error, "{fallback}");
    client.error(error.user_message(fallback)).await;
}
