//! Seed the marketplace catalog from a YAML file.
//!
//! The file lists categories, each with the products filed under it (see
//! `crates/cli/seed/catalog.yaml`). Seeding signs in as an admin and creates
//! whatever is missing: categories are matched by name and products by name
//! within their category, so re-running a seed is harmless.
//!
//! Existing products are listed page by page. `GET /categories` only lists
//! active categories (the first 100), so a seed naming an inactive category
//! tries to create it again and the API refusal is reported.

use std::collections::HashSet;
use std::path::Path;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info, warn};

use toys_marketplace_core::{Category, NewCategory, NewProduct, Price, Product, ProductQuery};
use toys_marketplace_web::api::{ApiClient, ApiError};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The seed file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    /// The seed file is not valid YAML for the expected shape.
    #[error("Invalid seed file: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The seed file parsed but failed validation.
    #[error("{0} validation errors found")]
    Invalid(usize),

    /// The signed-in account cannot manage the catalog.
    #[error("{0} is not an admin account")]
    NotAdmin(String),

    /// A marketplace API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Top level of a seed file.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub categories: Vec<SeedCategory>,
}

#[derive(Debug, Deserialize)]
pub struct SeedCategory {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
}

#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub stock_quantity: i32,
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
}

impl SeedFile {
    /// Number of products across every category.
    #[must_use]
    pub fn product_count(&self) -> usize {
        self.categories.iter().map(|c| c.products.len()).sum()
    }
}

impl SeedCategory {
    fn to_request(&self) -> NewCategory {
        NewCategory {
            name: self.name.trim().to_string(),
            description: non_blank(self.description.as_deref()),
            image_url: non_blank(self.image_url.as_deref()),
        }
    }
}

impl SeedProduct {
    fn to_request(&self, category: &Category) -> NewProduct {
        NewProduct {
            name: self.name.trim().to_string(),
            description: non_blank(self.description.as_deref()),
            price: self.price,
            stock_quantity: self.stock_quantity,
            category_id: category.id,
            image_url: non_blank(self.image_url.as_deref()),
            is_featured: self.is_featured,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

fn key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Check a parsed seed file, returning one message per problem.
#[must_use]
pub fn validate(seed: &SeedFile) -> Vec<String> {
    let mut errors = Vec::new();
    let mut category_names = HashSet::new();

    if seed.categories.is_empty() {
        errors.push("no categories listed".to_string());
    }

    for (i, category) in seed.categories.iter().enumerate() {
        let label = format!("categories[{i}]");
        if category.name.trim().is_empty() {
            errors.push(format!("{label}: name is required"));
        } else if !category_names.insert(key(&category.name)) {
            errors.push(format!("{label}: duplicate category '{}'", category.name.trim()));
        }

        let mut product_names = HashSet::new();
        for (j, product) in category.products.iter().enumerate() {
            let label = format!("{label}.products[{j}]");
            if product.name.trim().is_empty() {
                errors.push(format!("{label}: name is required"));
            } else if !product_names.insert(key(&product.name)) {
                errors.push(format!("{label}: duplicate product '{}'", product.name.trim()));
            }
            if !product.price.is_positive() {
                errors.push(format!("{label}: price must be greater than 0"));
            }
            if product.stock_quantity < 0 {
                errors.push(format!("{label}: stock_quantity cannot be negative"));
            }
        }
    }

    errors
}

/// Parse and validate a seed document.
///
/// # Errors
///
/// Returns `SeedError::Parse` for malformed YAML and `SeedError::Invalid`
/// when validation finds problems (each one is logged).
pub fn parse(content: &str) -> Result<SeedFile, SeedError> {
    let seed: SeedFile = serde_yaml::from_str(content)?;

    let errors = validate(&seed);
    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(SeedError::Invalid(errors.len()));
    }

    Ok(seed)
}

/// Read, parse and validate a seed file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid seed.
pub async fn load(path: &Path) -> Result<SeedFile, SeedError> {
    info!(path = %path.display(), "Loading seed file");

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Read {
            path: path.display().to_string(),
            source,
        })?;
    let seed = parse(&content)?;

    info!(
        categories = seed.categories.len(),
        products = seed.product_count(),
        "Seed file validated"
    );
    Ok(seed)
}

/// Products fetched per request when listing the existing catalog.
const PRODUCT_PAGE_SIZE: u32 = 100;

/// Every product in the catalog, fetched `page_size` at a time.
async fn list_all_products(api: &ApiClient, page_size: u32) -> Result<Vec<Product>, ApiError> {
    let page_size = page_size.max(1);
    let mut products = Vec::new();
    let mut skip = 0;
    loop {
        let page = api.list_products(ProductQuery::page(skip, page_size)).await?;
        let full = u32::try_from(page.len()).is_ok_and(|n| n >= page_size);
        products.extend(page);
        if !full {
            return Ok(products);
        }
        skip = skip.saturating_add(page_size);
    }
}

/// Counts reported when seeding finishes.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub categories_created: usize,
    pub categories_skipped: usize,
    pub products_created: usize,
    pub products_skipped: usize,
    /// `(name, error)` for each record the API refused.
    pub errors: Vec<(String, String)>,
}

/// Sign in as an admin and create every missing category and product.
///
/// A product the API refuses is reported and skipped; a category the API
/// refuses skips its products too.
///
/// # Errors
///
/// Returns an error if sign-in fails, the account is not an admin, or the
/// existing catalog cannot be listed.
pub async fn run(
    api: &ApiClient,
    email: &str,
    password: &SecretString,
    seed: &SeedFile,
) -> Result<SeedReport, SeedError> {
    let token = api.login(email, password.expose_secret()).await?;
    let token = SecretString::from(token.access_token);
    let admin = api.me(&token).await?;
    if !admin.is_admin {
        return Err(SeedError::NotAdmin(admin.email.to_string()));
    }
    info!(admin = %admin.username, "Signed in");

    let mut categories = api.list_categories().await?;
    let mut products = list_all_products(api, PRODUCT_PAGE_SIZE).await?;
    let mut report = SeedReport::default();

    for entry in &seed.categories {
        let category = match find_category(&categories, &entry.name) {
            Some(existing) => {
                report.categories_skipped += 1;
                info!(name = %existing.name, "Category already exists");
                existing.clone()
            }
            None => match api.create_category(&token, &entry.to_request()).await {
                Ok(created) => {
                    report.categories_created += 1;
                    info!(name = %created.name, id = %created.id, "Created category");
                    categories.push(created.clone());
                    created
                }
                Err(e) => {
                    warn!(name = %entry.name, error = %e, "Failed to create category");
                    report
                        .errors
                        .push((entry.name.clone(), e.user_message("create failed")));
                    continue;
                }
            },
        };

        for item in &entry.products {
            if find_product(&products, &category, &item.name).is_some() {
                report.products_skipped += 1;
                info!(name = %item.name, "Product already exists");
                continue;
            }
            match api.create_product(&token, &item.to_request(&category)).await {
                Ok(created) => {
                    report.products_created += 1;
                    info!(name = %created.name, price = %created.price, "Created product");
                    products.push(created);
                }
                Err(e) => {
                    warn!(name = %item.name, error = %e, "Failed to create product");
                    report
                        .errors
                        .push((item.name.clone(), e.user_message("create failed")));
                }
            }
        }
    }

    info!("Seeding complete!");
    info!(
        "  Categories: {} created, {} already present",
        report.categories_created, report.categories_skipped
    );
    info!(
        "  Products: {} created, {} already present",
        report.products_created, report.products_skipped
    );
    if !report.errors.is_empty() {
        error!("  Errors: {}", report.errors.len());
        for (name, err) in &report.errors {
            error!("    - {name}: {err}");
        }
    }

    Ok(report)
}

fn find_category<'a>(categories: &'a [Category], name: &str) -> Option<&'a Category> {
    let name = key(name);
    categories.iter().find(|c| key(&c.name) == name)
}

fn find_product<'a>(products: &'a [Product], category: &Category, name: &str) -> Option<&'a Product> {
    let name = key(name);
    products
        .iter()
        .find(|p| p.category_id == category.id && key(&p.name) == name)
}
