//! Write-then-refetch protocol for the user's cart, favorites and orders.
//!
//! Every mutating operation checks the identity before touching the
//! network, sends one request, and on success re-reads the whole
//! collection from the backend. The caller replaces its cached list with
//! what comes back. On failure nothing is re-read and the error is
//! returned as-is, so the cached list stays what it was.

use crate::api::{AddCartItem, AddFavorite, CatalogQuery, CreateOrder, RegisterUser, StoreApi, UserProfile};
use crate::cart::{clamp_quantity, find_line, CartItem, CartItemId};
use crate::error::{Result, ShopError};
use crate::favorite::{find_favorite, plan_toggle, Favorite, FavoriteToggle};
use crate::filter::FilterOptions;
use crate::identity::{require_identity, HostUser, TelegramId};
use crate::order::{Order, OrderId, OrderStats, ShippingDetails};
use crate::product::{Product, ProductId};

/// Orders (newest first) together with their aggregates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderHistory {
    pub orders: Vec<Order>,
    pub stats: OrderStats,
}

/// Result of a successful checkout: the new order plus the re-read
/// collections it affected.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderPlaced {
    pub order: Order,
    pub cart: Vec<CartItem>,
    pub history: OrderHistory,
}

fn logged<T>(what: &str, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        tracing::warn!("{what} failed: {e}");
    }
    result
}

pub async fn load_catalog<A: StoreApi>(api: &A) -> Result<Vec<Product>> {
    let products = logged("loading catalog", api.list_products(&CatalogQuery::all()).await)?;
    tracing::debug!("catalog loaded: {} products", products.len());
    Ok(products)
}

/// Filter choices from the backend, or derived from `catalog` when the
/// backend cannot serve them.
pub async fn load_filter_options<A: StoreApi>(api: &A, catalog: &[Product]) -> FilterOptions {
    match api.filter_options().await {
        Ok(options) => options,
        Err(e) => {
            tracing::warn!("filter options unavailable, deriving from catalog: {e}");
            FilterOptions::from_products(catalog)
        }
    }
}

pub async fn refresh_cart<A: StoreApi>(api: &A, identity: Option<TelegramId>) -> Result<Vec<CartItem>> {
    let user = require_identity(identity)?;
    logged("refreshing cart", api.cart(user).await)
}

pub async fn refresh_favorites<A: StoreApi>(api: &A, identity: Option<TelegramId>) -> Result<Vec<Favorite>> {
    let user = require_identity(identity)?;
    logged("refreshing favorites", api.favorites(user).await)
}

/// Orders newest first. When the stats endpoint fails the aggregates are
/// computed from the list instead.
pub async fn refresh_orders<A: StoreApi>(api: &A, identity: Option<TelegramId>) -> Result<OrderHistory> {
    let user = require_identity(identity)?;
    let mut orders = logged("refreshing orders", api.orders(user).await)?;
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    let stats = match api.order_stats(user).await {
        Ok(stats) => stats,
        Err(e) => {
            tracing::debug!("order stats unavailable, computing locally: {e}");
            OrderStats::from_orders(&orders)
        }
    };
    Ok(OrderHistory { orders, stats })
}

/// Add `quantity` units of `product` in `size` (the product's default size
/// when empty).
///
/// The backend keeps one line per product and size, so when `cart` already
/// holds that line its quantity is raised instead of posting a new one.
pub async fn add_to_cart<A: StoreApi>(
    api: &A,
    identity: Option<TelegramId>,
    cart: &[CartItem],
    product: &Product,
    size: &str,
    quantity: u32,
) -> Result<Vec<CartItem>> {
    let user = require_identity(identity)?;
    let size = match size.trim() {
        "" => product.default_size(),
        s => s,
    };
    let quantity = quantity.max(1);
    let sent = match find_line(cart, product.id, size) {
        Some(line) => {
            api.update_cart_item(user, line.id, line.quantity.saturating_add(quantity))
                .await
        }
        None => {
            let request = AddCartItem {
                telegram_id: user,
                product: product.id,
                quantity,
                selected_size: size.to_string(),
            };
            api.add_cart_item(&request).await
        }
    };
    logged("adding to cart", sent)?;
    refresh_cart(api, Some(user)).await
}

/// Set a line's quantity. Requests below one are raised to one.
pub async fn update_cart_quantity<A: StoreApi>(
    api: &A,
    identity: Option<TelegramId>,
    item: CartItemId,
    requested: i64,
) -> Result<Vec<CartItem>> {
    let user = require_identity(identity)?;
    let quantity = clamp_quantity(requested);
    logged("updating cart quantity", api.update_cart_item(user, item, quantity).await)?;
    refresh_cart(api, Some(user)).await
}

pub async fn remove_from_cart<A: StoreApi>(
    api: &A,
    identity: Option<TelegramId>,
    item: CartItemId,
) -> Result<Vec<CartItem>> {
    let user = require_identity(identity)?;
    logged("removing cart line", api.remove_cart_item(user, item).await)?;
    refresh_cart(api, Some(user)).await
}

pub async fn clear_cart<A: StoreApi>(api: &A, identity: Option<TelegramId>) -> Result<Vec<CartItem>> {
    let user = require_identity(identity)?;
    logged("clearing cart", api.clear_cart(user).await)?;
    refresh_cart(api, Some(user)).await
}

/// Flip `product` in or out of favorites, deciding from the cached list.
pub async fn toggle_favorite<A: StoreApi>(
    api: &A,
    identity: Option<TelegramId>,
    favorites: &[Favorite],
    product: ProductId,
) -> Result<Vec<Favorite>> {
    let user = require_identity(identity)?;
    let sent = match plan_toggle(favorites, product) {
        FavoriteToggle::Add => {
            api.add_favorite(&AddFavorite {
                telegram_id: user,
                product,
            })
            .await
        }
        FavoriteToggle::Remove(id) => api.remove_favorite(user, id).await,
    };
    logged("toggling favorite", sent)?;
    refresh_favorites(api, Some(user)).await
}

/// Remove `product` from favorites. When the cached list does not hold it
/// there is nothing to delete and the list is simply re-read.
pub async fn remove_favorite<A: StoreApi>(
    api: &A,
    identity: Option<TelegramId>,
    favorites: &[Favorite],
    product: ProductId,
) -> Result<Vec<Favorite>> {
    let user = require_identity(identity)?;
    match find_favorite(favorites, product) {
        Some(fav) => logged("removing favorite", api.remove_favorite(user, fav.id).await)?,
        None => tracing::debug!("product {product} not in favorites, nothing to remove"),
    }
    refresh_favorites(api, Some(user)).await
}

/// Check out the server-side cart.
///
/// Form problems and an empty cached cart are reported without a request.
pub async fn place_order<A: StoreApi>(
    api: &A,
    identity: Option<TelegramId>,
    cart: &[CartItem],
    details: &ShippingDetails,
) -> Result<OrderPlaced> {
    let user = require_identity(identity)?;
    details.validate().map_err(ShopError::InvalidCheckout)?;
    if cart.is_empty() {
        return Err(ShopError::EmptyCart);
    }
    let order = logged("placing order", api.create_order(&CreateOrder::new(user, details)).await)?;
    tracing::info!("order {} placed, total {}", order.order_number, order.total_amount);
    let cart = refresh_cart(api, Some(user)).await?;
    let history = refresh_orders(api, Some(user)).await?;
    Ok(OrderPlaced { order, cart, history })
}

pub async fn cancel_order<A: StoreApi>(api: &A, identity: Option<TelegramId>, order: OrderId) -> Result<OrderHistory> {
    let user = require_identity(identity)?;
    let message = logged("cancelling order", api.cancel_order(user, order).await)?;
    tracing::info!("order {order} cancelled: {message}");
    refresh_orders(api, Some(user)).await
}

/// Tell the backend who the host says we are. Failures only matter to the
/// log; the storefront works without a user record.
pub async fn register_user<A: StoreApi>(api: &A, host: &HostUser) -> Result<UserProfile> {
    logged("registering user", api.register_user(&RegisterUser::from(host)).await)
}
