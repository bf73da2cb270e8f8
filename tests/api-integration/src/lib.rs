//! In-process stand-in for the shop's REST backend.
//!
//! Answers with the same JSON shapes the real backend produces (decimal
//! strings for money, image objects, `{"error": ..}` / `{"detail": ..}`
//! bodies, per-user scoping on record routes) so the HTTP client and the
//! refresh protocol can be exercised end to end.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use kitshop_common::config::ApiConfig;
use kitshop_common::http::HttpStoreApi;
use kitshop_common::identity::TelegramId;

pub const ALICE: TelegramId = TelegramId(5_000_001);
pub const BOB: TelegramId = TelegramId(5_000_002);

/// A catalog row as the backend stores it.
#[derive(Debug, Clone)]
pub struct Kit {
    pub id: u64,
    pub team: &'static str,
    pub brand: &'static str,
    pub kit_type: &'static str,
    pub season: &'static str,
    pub condition: &'static str,
    pub price: u64,
    pub size: &'static str,
    pub stock: i64,
    pub is_available: bool,
    /// False when the image row exists but its file was removed.
    pub image_file: bool,
}

impl Kit {
    fn to_json(&self) -> Value {
        let mut badges = Vec::new();
        if self.condition == "New" {
            badges.push(json!({"type": "condition", "value": self.condition}));
        }
        badges.push(json!({"type": "brand", "value": self.brand}));
        badges.push(json!({"type": "season", "value": self.season}));
        json!({
            "id": self.id,
            "name": format!("{} ({})", self.team, self.season),
            "team": self.team,
            "national_team": null,
            "brand": self.brand,
            "manufacturer": self.brand,
            "league": self.team,
            "type": self.kit_type,
            "season": self.season,
            "kit_type": self.kit_type,
            "condition": self.condition,
            "price": decimal(self.price),
            "size": self.size,
            "color": "",
            "features": format!("{} {} kit", self.team, self.kit_type),
            "description": format!("{} {} kit", self.team, self.kit_type),
            "withPlayer": false,
            "contacts": null,
            "hashtags": null,
            "post_url": null,
            "is_available": self.is_available,
            "stock_quantity": self.stock,
            "created_at": "2024-01-15T10:00:00Z",
            "updated_at": "2024-01-15T10:00:00Z",
            "images": [{
                "id": self.id * 10,
                "image": self.image_file.then(|| format!("/media/products/{}.jpg", self.id)),
                "image_url": self.image_file.then(|| format!("http://testserver/media/products/{}.jpg", self.id)),
                "created_at": "2024-01-15T10:00:00Z"
            }],
            "images_count": 1,
            "badges": badges,
        })
    }
}

pub fn seed_catalog() -> Vec<Kit> {
    vec![
        Kit {
            id: 1,
            team: "Barcelona",
            brand: "Nike",
            kit_type: "Home",
            season: "2023/24",
            condition: "New",
            price: 6500,
            size: "M",
            stock: 5,
            is_available: true,
            image_file: true,
        },
        Kit {
            id: 2,
            team: "Argentina",
            brand: "Adidas",
            kit_type: "Home",
            season: "2022",
            condition: "New",
            price: 7000,
            size: "L",
            stock: 3,
            is_available: true,
            image_file: true,
        },
        Kit {
            id: 3,
            team: "Manchester United",
            brand: "Adidas",
            kit_type: "Home",
            season: "2023/24",
            condition: "New",
            price: 8000,
            size: "S, M, L",
            stock: 7,
            is_available: true,
            image_file: true,
        },
        Kit {
            id: 4,
            team: "Brazil",
            brand: "Nike",
            kit_type: "Away",
            season: "2022",
            condition: "Used",
            price: 5500,
            size: "M/L",
            stock: 1,
            is_available: true,
            image_file: true,
        },
    ]
}

fn decimal(amount: u64) -> String {
    format!("{amount}.00")
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

struct CartRow {
    id: u64,
    user: i64,
    product: u64,
    quantity: u32,
    size: String,
    created_at: String,
    updated_at: String,
}

struct FavoriteRow {
    id: u64,
    user: i64,
    product: u64,
    created_at: String,
}

struct OrderLine {
    id: u64,
    product: u64,
    quantity: u32,
    price: u64,
    size: String,
}

struct OrderRow {
    id: u64,
    user: i64,
    number: String,
    status: &'static str,
    total: u64,
    address: String,
    phone: String,
    notes: String,
    created_at: String,
    lines: Vec<OrderLine>,
}

#[derive(Default)]
struct Db {
    products: Vec<Kit>,
    users: Vec<i64>,
    cart: Vec<CartRow>,
    favorites: Vec<FavoriteRow>,
    orders: Vec<OrderRow>,
    next_id: u64,
    requests: Vec<String>,
}

impl Db {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn kit(&self, id: u64) -> Option<&Kit> {
        self.products.iter().find(|k| k.id == id)
    }

    fn kit_json(&self, id: u64) -> Value {
        self.kit(id).map(Kit::to_json).unwrap_or(Value::Null)
    }

    fn ensure_user(&mut self, user: i64) {
        if !self.users.contains(&user) {
            self.users.push(user);
        }
    }

    fn cart_json(&self, row: &CartRow) -> Value {
        json!({
            "id": row.id,
            "product": self.kit_json(row.product),
            "quantity": row.quantity,
            "selected_size": row.size,
            "created_at": row.created_at,
            "updated_at": row.updated_at,
        })
    }

    fn favorite_json(&self, row: &FavoriteRow) -> Value {
        json!({
            "id": row.id,
            "product": self.kit_json(row.product),
            "created_at": row.created_at,
        })
    }

    fn order_json(&self, row: &OrderRow) -> Value {
        let items: Vec<Value> = row
            .lines
            .iter()
            .map(|line| {
                json!({
                    "id": line.id,
                    "product": self.kit_json(line.product),
                    "quantity": line.quantity,
                    "price": decimal(line.price),
                    "selected_size": line.size,
                    "created_at": row.created_at,
                })
            })
            .collect();
        json!({
            "id": row.id,
            "user": row.user,
            "order_number": row.number,
            "status": row.status,
            "total_amount": decimal(row.total),
            "shipping_address": row.address,
            "phone_number": row.phone,
            "notes": if row.notes.is_empty() { Value::Null } else { Value::from(row.notes.clone()) },
            "created_at": row.created_at,
            "updated_at": row.created_at,
            "items": items,
        })
    }
}

type Shared = Arc<Mutex<Db>>;
type Reply = Result<Response, Response>;

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." }))).into_response()
}

fn ok(value: Value) -> Reply {
    Ok(Json(value).into_response())
}

#[derive(Deserialize)]
struct UserQuery {
    telegram_id: Option<i64>,
}

impl UserQuery {
    fn require(&self) -> Result<i64, Response> {
        self.telegram_id
            .ok_or_else(|| error(StatusCode::BAD_REQUEST, "telegram_id is required"))
    }
}

#[derive(Deserialize)]
struct ProductQuery {
    search: Option<String>,
    manufacturer: Option<String>,
    min_price: Option<u64>,
    max_price: Option<u64>,
}

async fn list_products(State(db): State<Shared>, Query(q): Query<ProductQuery>) -> Reply {
    let db = db.lock().await;
    let contains = |text: &str, needle: &str| text.to_lowercase().contains(&needle.to_lowercase());
    let products: Vec<Value> = db
        .products
        .iter()
        .filter(|k| q.manufacturer.as_deref().map_or(true, |m| contains(k.brand, m)))
        .filter(|k| {
            q.search.as_deref().map_or(true, |s| {
                contains(k.team, s) || contains(k.brand, s) || contains(k.season, s) || contains(k.kit_type, s)
            })
        })
        .filter(|k| q.min_price.map_or(true, |min| k.price >= min))
        .filter(|k| q.max_price.map_or(true, |max| k.price <= max))
        .map(Kit::to_json)
        .collect();
    ok(Value::from(products))
}

async fn get_product(State(db): State<Shared>, Path(id): Path<u64>) -> Reply {
    let db = db.lock().await;
    match db.kit(id).filter(|k| k.is_available) {
        Some(kit) => ok(kit.to_json()),
        None => Err(not_found()),
    }
}

async fn filter_options(State(db): State<Shared>) -> Reply {
    let db = db.lock().await;
    let mut kit_types: Vec<&str> = Vec::new();
    let mut brands: Vec<&str> = Vec::new();
    let mut teams: Vec<&str> = Vec::new();
    let mut seasons: Vec<&str> = Vec::new();
    let mut conditions: Vec<&str> = Vec::new();
    for kit in db.products.iter().filter(|k| k.is_available) {
        for (list, value) in [
            (&mut kit_types, kit.kit_type),
            (&mut brands, kit.brand),
            (&mut teams, kit.team),
            (&mut seasons, kit.season),
            (&mut conditions, kit.condition),
        ] {
            if !list.contains(&value) {
                list.push(value);
            }
        }
    }
    ok(json!({
        "type": kit_types,
        "manufacturer": brands,
        "league": teams,
        "season": seasons,
        "condition": conditions,
        "size": ["XS", "S", "M", "L", "XL", "XXL"],
    }))
}

async fn cart_by_user(State(db): State<Shared>, Query(q): Query<UserQuery>) -> Reply {
    let user = q.require()?;
    let db = db.lock().await;
    let rows: Vec<Value> = db.cart.iter().filter(|r| r.user == user).map(|r| db.cart_json(r)).collect();
    ok(Value::from(rows))
}

#[derive(Deserialize)]
struct CartCreate {
    telegram_id: i64,
    product: u64,
    quantity: u32,
    selected_size: String,
}

async fn cart_create(State(db): State<Shared>, Json(body): Json<CartCreate>) -> Reply {
    let mut db = db.lock().await;
    if db.kit(body.product).is_none() {
        let message = format!("Invalid pk \"{}\" - object does not exist.", body.product);
        return Err((StatusCode::BAD_REQUEST, Json(json!({ "product": [message] }))).into_response());
    }
    let duplicate = db
        .cart
        .iter()
        .any(|r| r.user == body.telegram_id && r.product == body.product && r.size == body.selected_size);
    if duplicate {
        let message = "The fields user, product, selected_size must make a unique set.";
        return Err((StatusCode::BAD_REQUEST, Json(json!({ "non_field_errors": [message] }))).into_response());
    }
    db.ensure_user(body.telegram_id);
    let id = db.next_id();
    let stamp = now();
    db.cart.push(CartRow {
        id,
        user: body.telegram_id,
        product: body.product,
        quantity: body.quantity,
        size: body.selected_size.clone(),
        created_at: stamp.clone(),
        updated_at: stamp,
    });
    // The create serializer echoes only the writable fields.
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "product": body.product,
            "quantity": body.quantity,
            "selected_size": body.selected_size,
        })),
    )
        .into_response())
}

#[derive(Deserialize)]
struct CartPatch {
    quantity: u32,
}

async fn cart_update(
    State(db): State<Shared>,
    Path(id): Path<u64>,
    Query(q): Query<UserQuery>,
    Json(body): Json<CartPatch>,
) -> Reply {
    let mut db = db.lock().await;
    let Some(user) = q.telegram_id else {
        return Err(not_found());
    };
    let row = db
        .cart
        .iter_mut()
        .find(|r| r.id == id && r.user == user)
        .ok_or_else(not_found)?;
    row.quantity = body.quantity;
    row.updated_at = now();
    let pos = db.cart.iter().position(|r| r.id == id).ok_or_else(not_found)?;
    ok(db.cart_json(&db.cart[pos]))
}

async fn cart_delete(State(db): State<Shared>, Path(id): Path<u64>, Query(q): Query<UserQuery>) -> Reply {
    let mut db = db.lock().await;
    let user = q.telegram_id.ok_or_else(not_found)?;
    let pos = db
        .cart
        .iter()
        .position(|r| r.id == id && r.user == user)
        .ok_or_else(not_found)?;
    db.cart.remove(pos);
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn cart_clear(State(db): State<Shared>, Query(q): Query<UserQuery>) -> Reply {
    let user = q.require()?;
    let mut db = db.lock().await;
    if !db.users.contains(&user) {
        return Err(error(StatusCode::NOT_FOUND, "User not found"));
    }
    db.cart.retain(|r| r.user != user);
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn favorites_by_user(State(db): State<Shared>, Query(q): Query<UserQuery>) -> Reply {
    let user = q.require()?;
    let db = db.lock().await;
    let rows: Vec<Value> = db
        .favorites
        .iter()
        .filter(|r| r.user == user)
        .map(|r| db.favorite_json(r))
        .collect();
    ok(Value::from(rows))
}

#[derive(Deserialize)]
struct FavoriteCreate {
    telegram_id: i64,
    product: u64,
}

async fn favorite_create(State(db): State<Shared>, Json(body): Json<FavoriteCreate>) -> Reply {
    let mut db = db.lock().await;
    if db.kit(body.product).is_none() {
        return Err(error(StatusCode::BAD_REQUEST, "Unknown product"));
    }
    if db.favorites.iter().any(|r| r.user == body.telegram_id && r.product == body.product) {
        let message = "The fields user, product must make a unique set.";
        return Err((StatusCode::BAD_REQUEST, Json(json!({ "non_field_errors": [message] }))).into_response());
    }
    db.ensure_user(body.telegram_id);
    let id = db.next_id();
    let row = FavoriteRow {
        id,
        user: body.telegram_id,
        product: body.product,
        created_at: now(),
    };
    let reply = db.favorite_json(&row);
    db.favorites.push(row);
    Ok((StatusCode::CREATED, Json(reply)).into_response())
}

async fn favorite_delete(State(db): State<Shared>, Path(id): Path<u64>, Query(q): Query<UserQuery>) -> Reply {
    let mut db = db.lock().await;
    let user = q.telegram_id.ok_or_else(not_found)?;
    let pos = db
        .favorites
        .iter()
        .position(|r| r.id == id && r.user == user)
        .ok_or_else(not_found)?;
    db.favorites.remove(pos);
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn favorite_check(State(db): State<Shared>, Path(product): Path<u64>, Query(q): Query<UserQuery>) -> Reply {
    let user = q.require()?;
    let db = db.lock().await;
    let is_favorite = db.favorites.iter().any(|r| r.user == user && r.product == product);
    ok(json!({ "is_favorite": is_favorite }))
}

#[derive(Deserialize)]
struct OrderCreate {
    telegram_id: Option<i64>,
    shipping_address: Option<String>,
    phone_number: Option<String>,
    #[serde(default)]
    notes: String,
}

async fn order_from_cart(State(db): State<Shared>, Json(body): Json<OrderCreate>) -> Reply {
    let user = body
        .telegram_id
        .ok_or_else(|| error(StatusCode::BAD_REQUEST, "telegram_id is required"))?;
    let (Some(address), Some(phone)) = (
        body.shipping_address.filter(|s| !s.is_empty()),
        body.phone_number.filter(|s| !s.is_empty()),
    ) else {
        return Err(error(StatusCode::BAD_REQUEST, "shipping_address and phone_number are required"));
    };
    let mut db = db.lock().await;
    if !db.users.contains(&user) {
        return Err(error(StatusCode::NOT_FOUND, "User not found"));
    }
    let rows: Vec<(u64, u32, String)> = db
        .cart
        .iter()
        .filter(|r| r.user == user)
        .map(|r| (r.product, r.quantity, r.size.clone()))
        .collect();
    if rows.is_empty() {
        return Err(error(StatusCode::BAD_REQUEST, "Cart is empty"));
    }
    let mut total = 0;
    for (product, quantity, _) in &rows {
        let kit = db.kit(*product).ok_or_else(not_found)?;
        if !kit.is_available {
            return Err(error(StatusCode::BAD_REQUEST, &format!("'{}' is no longer available", kit.team)));
        }
        if kit.stock < i64::from(*quantity) {
            return Err(error(StatusCode::BAD_REQUEST, &format!("Not enough '{}' in stock", kit.team)));
        }
        total += kit.price * u64::from(*quantity);
    }
    let mut lines = Vec::new();
    for (product, quantity, size) in rows {
        let id = db.next_id();
        let Some(kit) = db.products.iter_mut().find(|k| k.id == product) else {
            continue;
        };
        kit.stock -= i64::from(quantity);
        if kit.stock <= 0 {
            kit.is_available = false;
        }
        lines.push(OrderLine {
            id,
            product,
            quantity,
            price: kit.price,
            size,
        });
    }
    let id = db.next_id();
    let row = OrderRow {
        id,
        user,
        number: format!("ORD-{id:08X}"),
        status: "pending",
        total,
        address,
        phone,
        notes: body.notes,
        created_at: now(),
        lines,
    };
    let reply = db.order_json(&row);
    db.orders.push(row);
    db.cart.retain(|r| r.user != user);
    Ok((StatusCode::CREATED, Json(reply)).into_response())
}

async fn orders_by_user(State(db): State<Shared>, Query(q): Query<UserQuery>) -> Reply {
    let db = db.lock().await;
    // Without a user the backend answers with an empty list, not an error.
    let Some(user) = q.telegram_id else {
        return ok(json!([]));
    };
    let rows: Vec<Value> = db.orders.iter().filter(|o| o.user == user).map(|o| db.order_json(o)).collect();
    ok(Value::from(rows))
}

async fn order_stats(State(db): State<Shared>, Query(q): Query<UserQuery>) -> Reply {
    let user = q.require()?;
    let db = db.lock().await;
    if !db.users.contains(&user) {
        return Err(error(StatusCode::NOT_FOUND, "User not found"));
    }
    let mine: Vec<&OrderRow> = db.orders.iter().filter(|o| o.user == user).collect();
    let total_spent: u64 = mine.iter().map(|o| o.total).sum();
    ok(json!({
        "total_orders": mine.len(),
        "total_spent": total_spent as f64,
        "pending_orders": mine.iter().filter(|o| o.status == "pending").count(),
        "completed_orders": mine.iter().filter(|o| o.status == "delivered").count(),
    }))
}

#[derive(Deserialize)]
struct CancelBody {
    telegram_id: Option<i64>,
}

async fn order_cancel(State(db): State<Shared>, Path(id): Path<u64>, Json(body): Json<CancelBody>) -> Reply {
    let user = body
        .telegram_id
        .ok_or_else(|| error(StatusCode::BAD_REQUEST, "telegram_id is required"))?;
    let mut db = db.lock().await;
    let pos = db
        .orders
        .iter()
        .position(|o| o.id == id && o.user == user)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Order not found"))?;
    if db.orders[pos].status != "pending" {
        return Err(error(StatusCode::BAD_REQUEST, "Order cannot be cancelled"));
    }
    let returned: Vec<(u64, u32)> = db.orders[pos].lines.iter().map(|l| (l.product, l.quantity)).collect();
    for (product, quantity) in returned {
        if let Some(kit) = db.products.iter_mut().find(|k| k.id == product) {
            kit.stock += i64::from(quantity);
            if kit.stock > 0 {
                kit.is_available = true;
            }
        }
    }
    db.orders[pos].status = "cancelled";
    ok(json!({ "message": "Order cancelled" }))
}

#[derive(Deserialize)]
struct Register {
    telegram_id: Option<i64>,
    username: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    phone_number: Option<String>,
}

async fn register_telegram(State(db): State<Shared>, Json(body): Json<Register>) -> Reply {
    let user = body
        .telegram_id
        .ok_or_else(|| error(StatusCode::BAD_REQUEST, "telegram_id is required"))?;
    let mut db = db.lock().await;
    db.ensure_user(user);
    let id = db.users.iter().position(|u| *u == user).unwrap_or_default() + 1;
    ok(json!({
        "id": id,
        "telegram_id": user,
        "username": body.username,
        "first_name": body.first_name,
        "last_name": body.last_name,
        "phone_number": body.phone_number,
        "created_at": now(),
        "updated_at": now(),
        "is_active": true,
        "is_admin": false,
    }))
}

async fn record(State(db): State<Shared>, request: Request, next: Next) -> Response {
    db.lock()
        .await
        .requests
        .push(format!("{} {}", request.method(), request.uri()));
    next.run(request).await
}

fn router(db: Shared) -> Router {
    Router::new()
        .route("/api/products/", get(list_products))
        .route("/api/products/filter_options/", get(filter_options))
        .route("/api/products/{id}/", get(get_product))
        .route("/api/cart/", post(cart_create))
        .route("/api/cart/by_telegram_id/", get(cart_by_user))
        .route("/api/cart/clear/", delete(cart_clear))
        .route("/api/cart/{id}/", delete(cart_delete).patch(cart_update))
        .route("/api/favorites/", post(favorite_create))
        .route("/api/favorites/by_telegram_id/", get(favorites_by_user))
        .route("/api/favorites/{id}/", delete(favorite_delete))
        .route("/api/favorites/{id}/check/", get(favorite_check))
        .route("/api/orders/", get(orders_by_user))
        .route("/api/orders/create_from_cart/", post(order_from_cart))
        .route("/api/orders/stats/", get(order_stats))
        .route("/api/orders/{id}/cancel/", post(order_cancel))
        .route("/api/users/register_telegram/", post(register_telegram))
        .layer(middleware::from_fn_with_state(db.clone(), record))
        .with_state(db)
}

/// A running mock backend on an ephemeral local port.
pub struct MockBackend {
    pub addr: SocketAddr,
    db: Shared,
    server: tokio::task::JoinHandle<()>,
}

impl MockBackend {
    pub async fn start() -> Self {
        Self::start_with(seed_catalog()).await
    }

    pub async fn start_with(products: Vec<Kit>) -> Self {
        init_tracing();
        let next_id = products.iter().map(|k| k.id).max().unwrap_or(0) * 100;
        let db = Arc::new(Mutex::new(Db {
            products,
            next_id,
            ..Default::default()
        }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");
        let app = router(db.clone());
        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("mock backend stopped: {e}");
            }
        });
        tracing::debug!("mock backend listening on {addr}");
        MockBackend { addr, db, server }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn client(&self) -> HttpStoreApi {
        HttpStoreApi::new(ApiConfig::new(self.base_url())).expect("build http client")
    }

    /// Requests seen so far, as `METHOD /path?query`.
    pub async fn requests(&self) -> Vec<String> {
        self.db.lock().await.requests.clone()
    }

    pub async fn clear_requests(&self) {
        self.db.lock().await.requests.clear();
    }

    pub async fn stock(&self, product: u64) -> Option<i64> {
        self.db.lock().await.kit(product).map(|k| k.stock)
    }

    /// Staff-side status change.
    pub async fn set_order_status(&self, order: u64, status: &'static str) {
        let mut db = self.db.lock().await;
        if let Some(row) = db.orders.iter_mut().find(|o| o.id == order) {
            row.status = status;
        }
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
