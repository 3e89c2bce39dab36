//! Admin dashboard route handlers.
//!
//! The dashboard is a single page with tabs (`?tab=`) and two modal forms
//! (`?modal=`). Creating through a modal either redirects to the matching
//! tab or re-renders the dashboard with the modal still open and the
//! entered values kept.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use toys_marketplace_core::forms::{CategoryDraft, ProductDraft};
use toys_marketplace_core::navigation::AdminTab;
use toys_marketplace_core::{Category, CategoryId, Product, ProductId, ProductQuery};

use crate::api::ApiError;
use crate::error::add_breadcrumb;
use crate::filters;
use crate::layout::Layout;
use crate::middleware::{ClientSession, CspNonce, RequireAdmin};
use crate::state::AppState;

/// Modal forms on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminModal {
    AddCategory,
    AddProduct,
}

impl AdminModal {
    /// Parse the `?modal=` value. Unknown values open nothing.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Option<Self> {
        match value {
            Some("add-category") => Some(Self::AddCategory),
            Some("add-product") => Some(Self::AddProduct),
            _ => None,
        }
    }

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::AddCategory => "add-category",
            Self::AddProduct => "add-product",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub tab: Option<String>,
    pub modal: Option<String>,
}

/// Admin dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin.html")]
pub struct AdminTemplate {
    pub layout: Layout,
    pub tab: AdminTab,
    pub tabs: [AdminTab; 3],
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub modal: Option<AdminModal>,
    pub category_draft: CategoryDraft,
    pub product_draft: ProductDraft,
}

impl AdminTemplate {
    #[must_use]
    pub fn is_modal_open(&self, slug: &str) -> bool {
        self.modal.is_some_and(|modal| modal.slug() == slug)
    }

    /// URL that closes the open modal and stays on the current tab.
    #[must_use]
    pub fn close_url(&self) -> String {
        format!("/admin?tab={}", self.tab.slug())
    }
}

/// Everything needed to render the dashboard besides the data.
struct DashboardView {
    tab: AdminTab,
    modal: Option<AdminModal>,
    category_draft: CategoryDraft,
    product_draft: ProductDraft,
}

impl DashboardView {
    fn tab(tab: AdminTab) -> Self {
        Self {
            tab,
            modal: None,
            category_draft: CategoryDraft::default(),
            product_draft: ProductDraft::default(),
        }
    }
}

/// Fetch categories and products together and render the dashboard.
async fn render_dashboard(
    state: &AppState,
    client: &mut ClientSession,
    nonce: CspNonce,
    view: DashboardView,
) -> Response {
    let api = state.api();
    let (categories, products) = tokio::join!(
        api.list_categories(),
        api.list_products(ProductQuery::all())
    );
    let categories = client.check(categories).await;
    let products = client.check(products).await;

    if !client.is_authenticated() {
        return Redirect::to("/login").into_response();
    }

    let (categories, products) = match (categories, products) {
        (Ok(categories), Ok(products)) => (categories, products),
        (categories, products) => {
            if let Err(e) = &categories {
                tracing::error!(error = %e, "Failed to load categories");
            }
            if let Err(e) = &products {
                tracing::error!(error = %e, "Failed to load products");
            }
            client.error("Failed to load dashboard data").await;
            if view.modal == Some(AdminModal::AddProduct) && categories.is_err() {
                client.error("Failed to load categories").await;
            }
            (Vec::new(), Vec::new())
        }
    };

    AdminTemplate {
        layout: Layout::build(client, nonce, "/admin").await,
        tab: view.tab,
        tabs: AdminTab::ALL,
        categories,
        products,
        modal: view.modal,
        category_draft: view.category_draft,
        product_draft: view.product_draft,
    }
    .into_response()
}

/// After a failed API mutation: toast, then go to login if the token was
/// rejected, otherwise re-render.
async fn mutation_failed(
    state: &AppState,
    client: &mut ClientSession,
    nonce: CspNonce,
    error: &ApiError,
    fallback: &str,
    view: DashboardView,
) -> Response {
    tracing::warn!(error = %error, "{fallback}");
    client.error(error.user_message(fallback)).await;
    if !client.is_authenticated() {
        return Redirect::to("/login").into_response();
    }
    render_dashboard(state, client, nonce, view).await
}

// =============================================================================
// Dashboard
// =============================================================================

/// Display the admin dashboard.
#[instrument(skip(state, signed_in, nonce))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(signed_in): RequireAdmin,
    nonce: CspNonce,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let mut client = signed_in.client;
    let view = DashboardView {
        modal: AdminModal::parse(query.modal.as_deref()),
        ..DashboardView::tab(AdminTab::parse(query.tab.as_deref()))
    };
    render_dashboard(&state, &mut client, nonce, view).await
}

// =============================================================================
// Categories
// =============================================================================

/// Handle the Add Category modal.
#[instrument(skip_all, fields(name = %form.name.trim()))]
pub async fn create_category(
    State(state): State<AppState>,
    RequireAdmin(signed_in): RequireAdmin,
    nonce: CspNonce,
    Form(form): Form<CategoryDraft>,
) -> Response {
    let mut client = signed_in.client;
    let view = DashboardView {
        modal: Some(AdminModal::AddCategory),
        category_draft: form.clone(),
        ..DashboardView::tab(AdminTab::Categories)
    };

    let category = match form.validate() {
        Ok(category) => category,
        Err(e) => {
            client.error(e.to_string()).await;
            return render_dashboard(&state, &mut client, nonce, view).await;
        }
    };

    let result = state
        .api()
        .create_category(&signed_in.token, &category)
        .await;
    match client.check(result).await {
        Ok(created) => {
            tracing::info!(category_id = %created.id, "Category created");
            add_breadcrumb("admin", "Created category", Some(&[("name", created.name.as_str())]));
            client.success("Category added successfully!").await;
            Redirect::to("/admin?tab=categories").into_response()
        }
        Err(e) => mutation_failed(&state, &mut client, nonce, &e, "Failed to add category", view).await,
    }
}

/// Delete a category.
#[instrument(skip(state, signed_in))]
pub async fn delete_category(
    State(state): State<AppState>,
    RequireAdmin(signed_in): RequireAdmin,
    Path(id): Path<CategoryId>,
) -> Redirect {
    let mut client = signed_in.client;
    let result = state.api().delete_category(&signed_in.token, id).await;
    match client.check(result).await {
        Ok(()) => {
            tracing::info!(category_id = %id, "Category deleted");
            client.success("Category deleted successfully").await;
        }
        Err(e) => {
            tracing::warn!(error = %e, category_id = %id, "Failed to delete category");
            client.error("Failed to delete category").await;
        }
    }
    Redirect::to("/admin?tab=categories")
}

// =============================================================================
// Products
// =============================================================================

/// Handle the Add Product modal.
#[instrument(skip_all, fields(name = %form.name.trim()))]
pub async fn create_product(
    State(state): State<AppState>,
    RequireAdmin(signed_in): RequireAdmin,
    nonce: CspNonce,
    Form(form): Form<ProductDraft>,
) -> Response {
    let mut client = signed_in.client;
    let view = DashboardView {
        modal: Some(AdminModal::AddProduct),
        product_draft: form.clone(),
        ..DashboardView::tab(AdminTab::Products)
    };

    let product = match form.validate() {
        Ok(product) => product,
        Err(e) => {
            client.error(e.to_string()).await;
            return render_dashboard(&state, &mut client, nonce, view).await;
        }
    };

    let result = state.api().create_product(&signed_in.token, &product).await;
    match client.check(result).await {
        Ok(created) => {
            tracing::info!(product_id = %created.id, "Product created");
            add_breadcrumb("admin", "Created product", Some(&[("name", created.name.as_str())]));
            client.success("Product added successfully!").await;
            Redirect::to("/admin?tab=products").into_response()
        }
        Err(e) => mutation_failed(&state, &mut client, nonce, &e, "Failed to add product", view).await,
    }
}

/// Delete a product.
#[instrument(skip(state, signed_in))]
pub async fn delete_product(
    State(state): State<AppState>,
    RequireAdmin(signed_in): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Redirect {
    let mut client = signed_in.client;
    let result = state.api().delete_product(&signed_in.token, id).await;
    match client.check(result).await {
        Ok(()) => {
            tracing::info!(product_id = %id, "Product deleted");
            client.success("Product deleted successfully").await;
        }
        Err(e) => {
            tracing::warn!(error = %e, product_id = %id, "Failed to delete product");
            client.error("Failed to delete product").await;
        }
    }
    Redirect::to("/admin?tab=products")
}
