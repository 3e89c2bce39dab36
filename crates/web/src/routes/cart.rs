//! Cart route handlers.
//!
//! Every mutation is a plain form POST that redirects back (PRG). The
//! outcome is reported through a toast on the next page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use toys_marketplace_core::{CartItemId, ProductId};

use crate::filters;
use crate::layout::{Layout, return_to};
use crate::middleware::{ClientSession, CspNonce, RequireAuth};
use crate::services::cart::{self, CartContents};
use crate::state::AppState;

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
    /// Page to return to; defaults to the product listing.
    pub return_to: Option<String>,
}

/// Quantity stepper form data (the -/+ buttons).
#[derive(Debug, Deserialize)]
pub struct QuantityForm {
    /// Quantity currently shown on the page.
    pub current: u32,
    /// `-1` or `1`.
    pub delta: i32,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart.html")]
pub struct CartTemplate {
    pub layout: Layout,
    pub cart: CartContents,
}

/// Display the cart page.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(signed_in): RequireAuth,
    nonce: CspNonce,
) -> Response {
    let mut client = signed_in.client;
    let cart = cart::load(state.api(), &mut client).await;

    // The token may have been rejected while loading
    if !client.is_authenticated() {
        return Redirect::to("/login").into_response();
    }

    CartTemplate {
        layout: Layout::build(&client, nonce, "/cart").await,
        cart,
    }
    .into_response()
}

/// Add a product to the cart.
///
/// Open to anonymous visitors so the add buttons on public pages can
/// explain that a login is needed.
#[instrument(skip(state, client))]
pub async fn add(
    State(state): State<AppState>,
    mut client: ClientSession,
    Form(form): Form<AddToCartForm>,
) -> Redirect {
    cart::add(
        state.api(),
        &mut client,
        form.product_id,
        form.quantity.unwrap_or(1),
    )
    .await;
    Redirect::to(return_to(form.return_to.as_deref(), "/products"))
}

/// Step a line's quantity up or down by one.
#[instrument(skip(state, signed_in))]
pub async fn update_quantity(
    State(state): State<AppState>,
    RequireAuth(signed_in): RequireAuth,
    Path(item_id): Path<CartItemId>,
    Form(form): Form<QuantityForm>,
) -> Redirect {
    let mut client = signed_in.client;
    cart::update(state.api(), &mut client, item_id, form.current, form.delta).await;
    Redirect::to("/cart")
}

/// Remove a line from the cart.
#[instrument(skip(state, signed_in))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(signed_in): RequireAuth,
    Path(item_id): Path<CartItemId>,
) -> Redirect {
    let mut client = signed_in.client;
    cart::remove(state.api(), &mut client, item_id).await;
    Redirect::to("/cart")
}

/// Empty the cart.
#[instrument(skip_all)]
pub async fn clear(State(state): State<AppState>, RequireAuth(signed_in): RequireAuth) -> Redirect {
    let mut client = signed_in.client;
    cart::clear(state.api(), &mut client).await;
    Redirect::to("/cart")
}

/// Checkout placeholder.
#[instrument(skip_all)]
pub async fn checkout(RequireAuth(signed_in): RequireAuth) -> Redirect {
    cart::checkout(&signed_in.client).await;
    Redirect::to("/cart")
}
