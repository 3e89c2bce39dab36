//! Cart items and order summary arithmetic.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::{CartItemId, Price, ProductId, UserId, timestamp};

/// Sales tax applied to the cart subtotal (8%).
pub const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// A line in the authenticated user's server-side cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub user_id: UserId,
    pub product: Product,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CartItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price * self.quantity
    }
}

/// Body of `POST /cart`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCartItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl NewCartItem {
    /// A single unit of `product_id`.
    #[must_use]
    pub const fn one(product_id: ProductId) -> Self {
        Self {
            product_id,
            quantity: 1,
        }
    }
}

/// Body of `PUT /cart/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItemUpdate {
    pub quantity: u32,
}

/// Totals shown in the cart's order summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartSummary {
    pub subtotal: Price,
    pub tax: Price,
    pub total: Price,
    pub item_count: u32,
}

impl CartSummary {
    /// Compute totals over the given items.
    ///
    /// Shipping is always free; tax is [`TAX_RATE`] of the subtotal rounded
    /// to cents.
    #[must_use]
    pub fn from_items(items: &[CartItem]) -> Self {
        let subtotal: Price = items.iter().map(CartItem::line_total).sum();
        let tax = Price::new(subtotal.amount() * TAX_RATE);
        Self {
            subtotal,
            tax,
            total: subtotal + tax,
            item_count: item_count(items),
        }
    }
}

/// Total number of units across all lines (the navbar badge).
#[must_use]
pub fn item_count(items: &[CartItem]) -> u32 {
    items.iter().map(|item| item.quantity).sum()
}

/// Apply `delta` to `current`, returning `None` if the result would drop
/// below one unit.
#[must_use]
pub fn next_quantity(current: u32, delta: i32) -> Option<u32> {
    let next = i64::from(current) + i64::from(delta);
    u32::try_from(next).ok().filter(|q| *q >= 1)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::tests::product;

    fn item(id: i32, cents: i64, quantity: u32) -> CartItem {
        let product = product(id, "Toy", None, cents);
        CartItem {
            id: CartItemId::new(id),
            product_id: product.id,
            quantity,
            user_id: UserId::new(2),
            product,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_empty_cart_summary() {
        let summary = CartSummary::from_items(&[]);
        assert_eq!(summary, CartSummary::default());
        assert_eq!(summary.total.display(), "$0.00");
    }

    #[test]
    fn test_summary_sums_lines() {
        let items = vec![item(1, 8999, 2), item(2, 2499, 1)];
        let summary = CartSummary::from_items(&items);

        assert_eq!(summary.subtotal, Price::from_cents(20_497));
        assert_eq!(summary.item_count, 3);
    }

    #[test]
    fn test_summary_tax_and_total() {
        let items = vec![item(1, 10_000, 1)];
        let summary = CartSummary::from_items(&items);

        assert_eq!(summary.tax, Price::from_cents(800));
        assert_eq!(summary.total, Price::from_cents(10_800));
    }

    #[test]
    fn test_tax_rounds_to_cents() {
        // 8% of $39.99 is $3.1992
        let summary = CartSummary::from_items(&[item(1, 3999, 1)]);
        assert_eq!(summary.tax.display(), "$3.20");
        assert_eq!(summary.total.display(), "$43.19");
    }

    #[test]
    fn test_line_total() {
        assert_eq!(item(1, 1250, 4).line_total(), Price::from_cents(5000));
    }

    #[test]
    fn test_next_quantity() {
        assert_eq!(next_quantity(1, 1), Some(2));
        assert_eq!(next_quantity(3, -1), Some(2));
        assert_eq!(next_quantity(1, -1), None);
        assert_eq!(next_quantity(0, 0), None);
    }

    #[test]
    fn test_cart_item_deserializes_from_api() {
        let json = serde_json::json!({
            "id": 5,
            "product_id": 1,
            "quantity": 2,
            "user_id": 2,
            "product": serde_json::to_value(product(1, "Kite", None, 1500)).unwrap(),
            "created_at": "2024-05-01T08:00:00"
        });
        let item: CartItem = serde_json::from_value(json).unwrap();
        assert_eq!(item.quantity, 2);
        assert_eq!(item.line_total().display(), "$30.00");
    }
}
