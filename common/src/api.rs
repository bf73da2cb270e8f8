//! The REST backend as seen by the storefront.
//!
//! [`StoreApi`] is the seam between the refresh protocol and whatever talks
//! to the backend: the reqwest client in [`crate::http`] or the in-process
//! [`crate::memory`] store.

use serde::{Deserialize, Serialize};

use crate::cart::{CartItem, CartItemId};
use crate::error::Result;
use crate::favorite::{Favorite, FavoriteId};
use crate::filter::{ActiveFilterSet, FilterField, FilterOptions, PriceRange};
use crate::identity::{HostUser, TelegramId};
use crate::order::{Order, OrderId, OrderStats, ShippingDetails};
use crate::product::{Product, ProductId};

/// Body of `POST /cart/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddCartItem {
    pub telegram_id: TelegramId,
    pub product: ProductId,
    pub quantity: u32,
    pub selected_size: String,
}

/// Body of `PATCH /cart/{id}/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCartItem {
    pub quantity: u32,
}

/// Body of `POST /favorites/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddFavorite {
    pub telegram_id: TelegramId,
    pub product: ProductId,
}

/// Body of `POST /orders/create_from_cart/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrder {
    pub telegram_id: TelegramId,
    pub shipping_address: String,
    pub phone_number: String,
    pub notes: String,
}

impl CreateOrder {
    pub fn new(telegram_id: TelegramId, details: &ShippingDetails) -> Self {
        let details = details.normalized();
        Self {
            telegram_id,
            shipping_address: details.shipping_address,
            phone_number: details.phone_number,
            notes: details.notes,
        }
    }
}

/// Body of `POST /orders/{id}/cancel/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOrder {
    pub telegram_id: TelegramId,
}

/// Body of `POST /users/register_telegram/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterUser {
    pub telegram_id: TelegramId,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
}

impl From<&HostUser> for RegisterUser {
    fn from(user: &HostUser) -> Self {
        Self {
            telegram_id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone_number: None,
        }
    }
}

/// Backend user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    pub telegram_id: Option<TelegramId>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// Reply of `GET /favorites/{product}/check/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteCheck {
    pub is_favorite: bool,
}

/// Reply of `POST /orders/{id}/cancel/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReply {
    pub message: String,
}

/// Optional server-side narrowing for `GET /products/`.
///
/// The storefront loads the full catalog and filters locally; this exists
/// for callers that want the backend to do it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub filters: ActiveFilterSet,
    pub search: String,
}

impl CatalogQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search: text.into(),
            ..Default::default()
        }
    }

    /// Query parameters in a stable order, empty values omitted.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs: Vec<(&'static str, String)> = self
            .filters
            .active_fields()
            .map(|(field, value)| (field.query_key(), value.to_string()))
            .collect();
        let PriceRange { min, max } = self.filters.price;
        if min > 0 {
            pairs.push(("min_price", min.to_string()));
        }
        if max < u64::MAX {
            pairs.push(("max_price", max.to_string()));
        }
        let search = self.search.trim();
        if !search.is_empty() {
            pairs.push(("search", search.to_string()));
        }
        pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs().is_empty()
    }

    /// Field lookup used by in-process backends.
    pub fn filter(&self, field: FilterField) -> Option<&str> {
        self.filters.get(field)
    }
}

/// Endpoint paths, relative to the `/api` prefix.
pub mod paths {
    use crate::cart::CartItemId;
    use crate::favorite::FavoriteId;
    use crate::order::OrderId;
    use crate::product::ProductId;

    pub const PRODUCTS: &str = "/products/";
    pub const FILTER_OPTIONS: &str = "/products/filter_options/";
    pub const CART: &str = "/cart/";
    pub const CART_BY_USER: &str = "/cart/by_telegram_id/";
    pub const CART_CLEAR: &str = "/cart/clear/";
    pub const FAVORITES: &str = "/favorites/";
    pub const FAVORITES_BY_USER: &str = "/favorites/by_telegram_id/";
    pub const ORDERS: &str = "/orders/";
    pub const ORDER_FROM_CART: &str = "/orders/create_from_cart/";
    pub const ORDER_STATS: &str = "/orders/stats/";
    pub const REGISTER_USER: &str = "/users/register_telegram/";

    pub fn product(id: ProductId) -> String {
        format!("/products/{id}/")
    }

    pub fn cart_item(id: CartItemId) -> String {
        format!("/cart/{id}/")
    }

    pub fn favorite(id: FavoriteId) -> String {
        format!("/favorites/{id}/")
    }

    pub fn favorite_check(product: ProductId) -> String {
        format!("/favorites/{product}/check/")
    }

    pub fn order_cancel(id: OrderId) -> String {
        format!("/orders/{id}/cancel/")
    }
}

/// Operations the storefront needs from the backend.
///
/// Everything user-owned is addressed by [`TelegramId`]. The backend only
/// resolves a cart line or favorite inside the owner's records, so the
/// record-level calls carry the user too.
///
/// Cart and favorite mutations return nothing: callers re-read the whole
/// collection afterwards, and the backend's create replies are partial.
#[allow(async_fn_in_trait)]
pub trait StoreApi {
    async fn list_products(&self, query: &CatalogQuery) -> Result<Vec<Product>>;

    async fn product(&self, id: ProductId) -> Result<Product>;

    async fn filter_options(&self) -> Result<FilterOptions>;

    async fn cart(&self, user: TelegramId) -> Result<Vec<CartItem>>;

    async fn add_cart_item(&self, request: &AddCartItem) -> Result<()>;

    async fn update_cart_item(&self, user: TelegramId, id: CartItemId, quantity: u32) -> Result<()>;

    async fn remove_cart_item(&self, user: TelegramId, id: CartItemId) -> Result<()>;

    async fn clear_cart(&self, user: TelegramId) -> Result<()>;

    async fn favorites(&self, user: TelegramId) -> Result<Vec<Favorite>>;

    async fn add_favorite(&self, request: &AddFavorite) -> Result<()>;

    async fn remove_favorite(&self, user: TelegramId, id: FavoriteId) -> Result<()>;

    async fn check_favorite(&self, user: TelegramId, product: ProductId) -> Result<bool>;

    /// Turns the user's server-side cart into an order and empties the cart.
    async fn create_order(&self, request: &CreateOrder) -> Result<Order>;

    async fn orders(&self, user: TelegramId) -> Result<Vec<Order>>;

    async fn order_stats(&self, user: TelegramId) -> Result<OrderStats>;

    /// Returns the backend's confirmation text.
    async fn cancel_order(&self, user: TelegramId, id: OrderId) -> Result<String>;

    async fn register_user(&self, request: &RegisterUser) -> Result<UserProfile>;
}
