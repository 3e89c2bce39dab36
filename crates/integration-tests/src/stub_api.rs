//! In-process stand-in for the marketplace REST API.
//!
//! Serves the same JSON shapes and `{"detail": "..."}` error bodies as the
//! real API from an in-memory store, seeded with an admin, a customer, two
//! categories and three products. Every request is recorded so tests can
//! assert which calls were (or were not) made.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::{Next, from_fn_with_state},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use url::Url;

use toys_marketplace_core::{
    CartItem, CartItemId, CartItemUpdate, Category, CategoryId, Email, NewCartItem, NewCategory,
    NewProduct, Price, Product, ProductId, User, UserId,
};

pub const ADMIN_EMAIL: &str = "admin@toysmarketplace.com";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const USER_EMAIL: &str = "user@toysmarketplace.com";
pub const USER_PASSWORD: &str = "user123";

/// Seeded product ids.
pub const HERO_FIGURE: i32 = 1;
pub const TEDDY_BEAR: i32 = 2;
pub const ROBOT_DOG: i32 = 3;

type ApiResult<T> = Result<T, Response>;

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

// =============================================================================
// Store
// =============================================================================

struct Account {
    user: User,
    password: String,
}

#[derive(Default)]
struct StubData {
    accounts: Vec<Account>,
    tokens: HashMap<String, UserId>,
    categories: Vec<Category>,
    products: Vec<Product>,
    cart: Vec<CartItem>,
    next_id: i32,
    requests: Vec<String>,
    catalog_down: bool,
}

fn user(id: i32, username: &str, email: &str, full_name: &str, is_admin: bool) -> User {
    User {
        id: UserId::new(id),
        username: username.to_string(),
        email: Email::parse(email).unwrap_or_else(|e| panic!("seed email {email}: {e}")),
        full_name: Some(full_name.to_string()),
        is_admin,
        is_active: true,
        created_at: Utc::now(),
        updated_at: None,
    }
}

fn category(id: i32, name: &str, description: Option<&str>) -> Category {
    Category {
        id: CategoryId::new(id),
        name: name.to_string(),
        description: description.map(String::from),
        image_url: None,
        is_active: true,
        created_at: Utc::now(),
        updated_at: None,
    }
}

impl StubData {
    fn seeded() -> Self {
        let admin = user(1, "admin", ADMIN_EMAIL, "Admin User", true);
        let customer = user(2, "user", USER_EMAIL, "Regular User", false);
        let figures = category(1, "Action Figures", Some("Collectible action figures"));
        let plush = category(2, "Plush Toys", None);

        let mut data = Self {
            next_id: 100,
            ..Self::default()
        };
        for (name, description, cents, stock, category, featured) in [
            ("Hero Figure", "Poseable superhero figure", 1999, 5, &figures, true),
            ("Teddy Bear", "Soft and huggable", 2499, 0, &plush, false),
            ("Robot Dog", "Walks and barks on command", 4999, 10, &figures, false),
        ] {
            let id = i32::try_from(data.products.len()).unwrap_or(0) + 1;
            let product = data.product(
                ProductId::new(id),
                NewProduct {
                    name: name.to_string(),
                    description: Some(description.to_string()),
                    price: Price::from_cents(cents),
                    stock_quantity: stock,
                    category_id: category.id,
                    image_url: None,
                    is_featured: featured,
                },
                category.clone(),
                admin.clone(),
            );
            data.products.push(product);
        }
        data.accounts = vec![
            Account {
                user: admin,
                password: ADMIN_PASSWORD.to_string(),
            },
            Account {
                user: customer,
                password: USER_PASSWORD.to_string(),
            },
        ];
        data.categories = vec![figures, plush];
        data
    }

    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn product(&self, id: ProductId, new: NewProduct, category: Category, seller: User) -> Product {
        Product {
            id,
            name: new.name,
            description: new.description,
            price: new.price,
            stock_quantity: new.stock_quantity,
            image_url: new.image_url,
            category_id: category.id,
            seller_id: seller.id,
            is_active: true,
            is_featured: new.is_featured,
            category,
            seller,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// The user owning the request's bearer token.
    fn user_for(&self, headers: &HeaderMap) -> ApiResult<User> {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .and_then(|token| self.tokens.get(token))
            .and_then(|id| self.accounts.iter().find(|a| a.user.id == *id))
            .map(|account| account.user.clone())
            .ok_or_else(|| detail(StatusCode::UNAUTHORIZED, "Could not validate credentials"))
    }

    fn admin_for(&self, headers: &HeaderMap) -> ApiResult<User> {
        let user = self.user_for(headers)?;
        if user.is_admin {
            Ok(user)
        } else {
            Err(detail(StatusCode::FORBIDDEN, "Not enough permissions"))
        }
    }

    fn catalog_available(&self) -> ApiResult<()> {
        if self.catalog_down {
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response())
        } else {
            Ok(())
        }
    }
}

// =============================================================================
// Handle
// =============================================================================

/// Shared handle on the stub's store.
#[derive(Clone)]
pub struct StubState(Arc<Mutex<StubData>>);

impl StubState {
    fn lock(&self) -> MutexGuard<'_, StubData> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Invalidate every issued token, as if they all expired.
    pub fn revoke_tokens(&self) {
        self.lock().tokens.clear();
    }

    /// Make category and product listings answer 500.
    pub fn set_catalog_down(&self, down: bool) {
        self.lock().catalog_down = down;
    }

    /// How many requests matched `"METHOD /path"` exactly.
    #[must_use]
    pub fn request_count(&self, request: &str) -> usize {
        self.lock().requests.iter().filter(|r| *r == request).count()
    }

    #[must_use]
    pub fn category_names(&self) -> Vec<String> {
        self.lock().categories.iter().map(|c| c.name.clone()).collect()
    }

    #[must_use]
    pub fn product_names(&self) -> Vec<String> {
        self.lock().products.iter().map(|p| p.name.clone()).collect()
    }

    /// Every cart line, across all users.
    #[must_use]
    pub fn cart_lines(&self) -> Vec<CartItem> {
        self.lock().cart.clone()
    }
}

/// A running stub API.
pub struct StubApi {
    pub url: Url,
    pub state: StubState,
}

impl StubApi {
    /// Serve a freshly seeded stub on an ephemeral local port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn() -> Self {
        let state = StubState(Arc::new(Mutex::new(StubData::seeded())));
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub API listener");
        let addr = listener.local_addr().expect("stub API address");

        let app = router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub API server");
        });

        Self {
            url: Url::parse(&format!("http://{addr}/")).expect("stub API URL"),
            state,
        }
    }
}

fn router(state: StubState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/me", get(me))
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/{id}", delete(delete_category))
        .route("/products", get(list_products).post(create_product))
        .route("/products/{id}", delete(delete_product))
        .route("/cart", get(get_cart).post(add_to_cart).delete(clear_cart))
        .route("/cart/{id}", delete(remove_cart_item).put(update_cart_item))
        .layer(from_fn_with_state(state.clone(), record))
        .with_state(state)
}

async fn record(State(stub): State<StubState>, request: Request, next: Next) -> Response {
    stub.lock()
        .requests
        .push(format!("{} {}", request.method(), request.uri().path()));
    next.run(request).await
}

// =============================================================================
// Handlers
// =============================================================================

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(State(stub): State<StubState>, Json(body): Json<LoginBody>) -> Response {
    let mut data = stub.lock();
    let Some(user_id) = data
        .accounts
        .iter()
        .find(|a| a.user.email.as_str().eq_ignore_ascii_case(&body.email) && a.password == body.password)
        .map(|a| a.user.id)
    else {
        return detail(StatusCode::UNAUTHORIZED, "Incorrect email or password");
    };

    let token = format!("token-{user_id}-{}", data.next_id());
    data.tokens.insert(token.clone(), user_id);
    Json(json!({ "access_token": token, "token_type": "bearer" })).into_response()
}

#[derive(Deserialize)]
struct RegisterBody {
    email: String,
    username: String,
    full_name: Option<String>,
    password: String,
}

async fn register(State(stub): State<StubState>, Json(body): Json<RegisterBody>) -> ApiResult<Json<User>> {
    let mut data = stub.lock();
    let email = Email::parse(&body.email).map_err(|_| detail(StatusCode::BAD_REQUEST, "Invalid email"))?;
    if data.accounts.iter().any(|a| a.user.email == email) {
        return Err(detail(StatusCode::BAD_REQUEST, "Email already registered"));
    }
    if data.accounts.iter().any(|a| a.user.username == body.username) {
        return Err(detail(StatusCode::BAD_REQUEST, "Username already taken"));
    }

    let id = data.next_id();
    let mut created = user(id, &body.username, email.as_str(), "", false);
    created.full_name = body.full_name;
    data.accounts.push(Account {
        user: created.clone(),
        password: body.password,
    });
    Ok(Json(created))
}

async fn me(State(stub): State<StubState>, headers: HeaderMap) -> ApiResult<Json<User>> {
    stub.lock().user_for(&headers).map(Json)
}

async fn list_categories(State(stub): State<StubState>) -> ApiResult<Json<Vec<Category>>> {
    let data = stub.lock();
    data.catalog_available()?;
    Ok(Json(data.categories.clone()))
}

async fn create_category(
    State(stub): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<NewCategory>,
) -> ApiResult<Json<Category>> {
    let mut data = stub.lock();
    data.admin_for(&headers)?;
    if data.categories.iter().any(|c| c.name.eq_ignore_ascii_case(&body.name)) {
        return Err(detail(StatusCode::BAD_REQUEST, "Category already exists"));
    }

    let id = data.next_id();
    let mut created = category(id, &body.name, body.description.as_deref());
    created.image_url = body.image_url;
    data.categories.push(created.clone());
    Ok(Json(created))
}

async fn delete_category(
    State(stub): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<CategoryId>,
) -> ApiResult<Json<Value>> {
    let mut data = stub.lock();
    data.admin_for(&headers)?;
    let before = data.categories.len();
    data.categories.retain(|c| c.id != id);
    if data.categories.len() == before {
        return Err(detail(StatusCode::NOT_FOUND, "Category not found"));
    }
    Ok(Json(json!({ "message": "Category deleted successfully" })))
}

#[derive(Deserialize)]
struct ProductParams {
    category_id: Option<CategoryId>,
    skip: Option<usize>,
    limit: Option<usize>,
}

async fn list_products(
    State(stub): State<StubState>,
    Query(params): Query<ProductParams>,
) -> ApiResult<Json<Vec<Product>>> {
    let data = stub.lock();
    data.catalog_available()?;
    let products = data
        .products
        .iter()
        .filter(|p| params.category_id.is_none_or(|id| p.category_id == id))
        .skip(params.skip.unwrap_or(0))
        .take(params.limit.unwrap_or(usize::MAX))
        .cloned()
        .collect();
    Ok(Json(products))
}

async fn create_product(
    State(stub): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<NewProduct>,
) -> ApiResult<Json<Product>> {
    let mut data = stub.lock();
    let seller = data.admin_for(&headers)?;
    let category = data
        .categories
        .iter()
        .find(|c| c.id == body.category_id)
        .cloned()
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "Category not found"))?;

    let id = ProductId::new(data.next_id());
    let created = data.product(id, body, category, seller);
    data.products.push(created.clone());
    Ok(Json(created))
}

async fn delete_product(
    State(stub): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<ProductId>,
) -> ApiResult<Json<Value>> {
    let mut data = stub.lock();
    data.admin_for(&headers)?;
    let before = data.products.len();
    data.products.retain(|p| p.id != id);
    if data.products.len() == before {
        return Err(detail(StatusCode::NOT_FOUND, "Product not found"));
    }
    data.cart.retain(|item| item.product_id != id);
    Ok(Json(json!({ "message": "Product deleted successfully" })))
}

async fn get_cart(State(stub): State<StubState>, headers: HeaderMap) -> ApiResult<Json<Vec<CartItem>>> {
    let data = stub.lock();
    let user = data.user_for(&headers)?;
    let items = data
        .cart
        .iter()
        .filter(|item| item.user_id == user.id)
        .cloned()
        .collect();
    Ok(Json(items))
}

fn check_stock(product: &Product, quantity: u32) -> ApiResult<()> {
    if i64::from(quantity) > i64::from(product.stock_quantity) {
        Err(detail(StatusCode::BAD_REQUEST, "Not enough stock available"))
    } else {
        Ok(())
    }
}

async fn add_to_cart(
    State(stub): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<NewCartItem>,
) -> ApiResult<Json<CartItem>> {
    let mut data = stub.lock();
    let user = data.user_for(&headers)?;
    let product = data
        .products
        .iter()
        .find(|p| p.id == body.product_id)
        .cloned()
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "Product not found"))?;

    if let Some(item) = data
        .cart
        .iter_mut()
        .find(|item| item.user_id == user.id && item.product_id == product.id)
    {
        let quantity = item.quantity + body.quantity;
        check_stock(&product, quantity)?;
        item.quantity = quantity;
        item.updated_at = Some(Utc::now());
        return Ok(Json(item.clone()));
    }

    check_stock(&product, body.quantity)?;
    let item = CartItem {
        id: CartItemId::new(data.next_id()),
        product_id: product.id,
        quantity: body.quantity,
        user_id: user.id,
        product,
        created_at: Utc::now(),
        updated_at: None,
    };
    data.cart.push(item.clone());
    Ok(Json(item))
}

async fn update_cart_item(
    State(stub): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<CartItemId>,
    Json(body): Json<CartItemUpdate>,
) -> ApiResult<Json<CartItem>> {
    let mut data = stub.lock();
    let user = data.user_for(&headers)?;
    let item = data
        .cart
        .iter_mut()
        .find(|item| item.id == id && item.user_id == user.id)
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "Cart item not found"))?;

    check_stock(&item.product, body.quantity)?;
    item.quantity = body.quantity;
    item.updated_at = Some(Utc::now());
    Ok(Json(item.clone()))
}

async fn remove_cart_item(
    State(stub): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<CartItemId>,
) -> ApiResult<Json<Value>> {
    let mut data = stub.lock();
    let user = data.user_for(&headers)?;
    let before = data.cart.len();
    data.cart.retain(|item| !(item.id == id && item.user_id == user.id));
    if data.cart.len() == before {
        return Err(detail(StatusCode::NOT_FOUND, "Cart item not found"));
    }
    Ok(Json(json!({ "message": "Item removed from cart" })))
}

async fn clear_cart(State(stub): State<StubState>, headers: HeaderMap) -> ApiResult<Json<Value>> {
    let mut data = stub.lock();
    let user = data.user_for(&headers)?;
    data.cart.retain(|item| item.user_id != user.id);
    Ok(Json(json!({ "message": "Cart cleared" })))
}
