//! Categories, products and client-side catalog filtering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::User;
use crate::types::{CategoryId, Price, ProductId, UserId, timestamp};

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub is_active: bool,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Category {
    /// "Active" or "Inactive".
    #[must_use]
    pub const fn status_label(&self) -> &'static str {
        if self.is_active { "Active" } else { "Inactive" }
    }
}

/// A product listed on the marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Price,
    #[serde(default)]
    pub stock_quantity: i32,
    #[serde(default)]
    pub image_url: Option<String>,
    pub category_id: CategoryId,
    pub seller_id: UserId,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
    pub category: Category,
    pub seller: User,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

const fn default_true() -> bool {
    true
}

impl Product {
    /// Whether at least one unit is available.
    #[must_use]
    pub const fn is_in_stock(&self) -> bool {
        self.stock_quantity > 0
    }

    /// Case-insensitive substring match on name or description.
    ///
    /// `needle` must already be lowercased.
    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle))
    }
}

/// Keep the products whose name or description contains `term`.
///
/// Matching is case-insensitive and ignores surrounding whitespace. A blank
/// term keeps every product. Input order is preserved.
#[must_use]
pub fn filter_products<'a>(products: &'a [Product], term: &str) -> Vec<&'a Product> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return products.iter().collect();
    }
    products.iter().filter(|p| p.matches(&needle)).collect()
}

/// Query parameters accepted by `GET /products`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ProductQuery {
    pub category_id: Option<CategoryId>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl ProductQuery {
    /// All products.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            category_id: None,
            skip: None,
            limit: None,
        }
    }

    /// Products in a single category.
    #[must_use]
    pub const fn in_category(category_id: CategoryId) -> Self {
        Self {
            category_id: Some(category_id),
            skip: None,
            limit: None,
        }
    }

    /// The first `limit` products.
    #[must_use]
    pub const fn first(limit: u32) -> Self {
        Self {
            category_id: None,
            skip: None,
            limit: Some(limit),
        }
    }

    /// `limit` products starting after the first `skip`.
    ///
    /// The API returns at most 100 products when no limit is given, so
    /// complete listings are fetched page by page.
    #[must_use]
    pub const fn page(skip: u32, limit: u32) -> Self {
        Self {
            category_id: None,
            skip: Some(skip),
            limit: Some(limit),
        }
    }

    /// Query-string pairs for the request URL.
    #[must_use]
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(category_id) = self.category_id {
            pairs.push(("category_id", category_id.to_string()));
        }
        if let Some(skip) = self.skip {
            pairs.push(("skip", skip.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

/// Body of `POST /categories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Body of `POST /products`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub stock_quantity: i32,
    pub category_id: CategoryId,
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
}
