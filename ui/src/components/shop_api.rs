use dioxus::prelude::*;
use futures::StreamExt;

use kitshop_common::actions;
use kitshop_common::api::StoreApi;
use kitshop_common::cart::CartItemId;
use kitshop_common::error::{Result, ShopError};
use kitshop_common::identity::TelegramId;
use kitshop_common::order::{OrderId, ShippingDetails};
use kitshop_common::product::ProductId;
use kitshop_common::state::ShopState;

use super::shop_state::{use_host_info, use_shop_state};
use super::telegram::HostInfo;

/// Everything the views ask of the backend. Handled strictly one at a time,
/// in the order sent.
#[derive(Debug, Clone)]
pub enum ShopAction {
    /// (Re)load the catalog, filter options and the user's collections.
    Bootstrap,
    AddToCart {
        product: ProductId,
        /// Empty means the product's default size.
        size: String,
        quantity: u32,
    },
    UpdateQuantity { item: CartItemId, quantity: i64 },
    RemoveFromCart(CartItemId),
    ClearCart,
    /// Sent only after `ShopState::begin_favorite_toggle` succeeded.
    ToggleFavorite(ProductId),
    RemoveFavorite(ProductId),
    PlaceOrder(ShippingDetails),
    CancelOrder(OrderId),
    RefreshOrders,
}

pub fn use_shop_action() -> Coroutine<ShopAction> {
    use_coroutine_handle::<ShopAction>()
}

/// Flip a favorite unless a toggle for the same product is still in flight.
pub fn request_favorite_toggle(mut state: Signal<ShopState>, shop: Coroutine<ShopAction>, product: ProductId) {
    if state.write().begin_favorite_toggle(product) {
        shop.send(ShopAction::ToggleFavorite(product));
    } else {
        tracing::debug!("{}", ShopError::ToggleInFlight(product));
    }
}

#[cfg(feature = "offline")]
type Backend = kitshop_common::memory::MemoryStore;

#[cfg(not(feature = "offline"))]
type Backend = kitshop_common::http::HttpStoreApi;

#[cfg(feature = "offline")]
fn connect(_host: &HostInfo) -> Result<Backend> {
    tracing::info!("offline mode: serving the demo catalog");
    Ok(kitshop_common::memory::MemoryStore::demo())
}

#[cfg(not(feature = "offline"))]
fn connect(host: &HostInfo) -> Result<Backend> {
    let config = kitshop_common::config::ApiConfig::for_host(&host.hostname);
    tracing::info!("shop backend: {}", config.base_url);
    kitshop_common::http::HttpStoreApi::new(config)
}

/// Start the shop coroutine. It loads everything once on startup, then
/// serves [`ShopAction`]s.
pub fn use_shop_coroutine() {
    let state = use_shop_state();
    let host = use_host_info();
    use_coroutine(move |rx: UnboundedReceiver<ShopAction>| {
        let host = host.peek().clone();
        shop_loop(rx, state, host)
    });
}

async fn shop_loop(mut rx: UnboundedReceiver<ShopAction>, mut state: Signal<ShopState>, host: HostInfo) {
    let api = match connect(&host) {
        Ok(api) => api,
        Err(e) => {
            tracing::error!("cannot create shop client: {e}");
            let mut s = state.write();
            s.catalog_loading = false;
            s.report_error(&e);
            return;
        }
    };

    if let Some(user) = &host.user {
        if let Ok(profile) = actions::register_user(&api, user).await {
            tracing::debug!("registered as user {}", profile.id);
        }
    }
    handle(&api, state, ShopAction::Bootstrap).await;

    while let Some(action) = rx.next().await {
        tracing::debug!("shop action: {action:?}");
        handle(&api, state, action).await;
    }
}

/// Store a protocol result: the value goes through `apply`, an error into
/// the banner.
fn settle<T>(mut state: Signal<ShopState>, result: Result<T>, apply: impl FnOnce(&mut ShopState, T)) {
    let mut s = state.write();
    match result {
        Ok(value) => apply(&mut *s, value),
        Err(e) => s.report_error(&e),
    }
}

async fn handle<A: StoreApi>(api: &A, mut state: Signal<ShopState>, action: ShopAction) {
    let (identity, cart, favorites) = {
        let s = state.read();
        (s.identity, s.cart.clone(), s.favorites.clone())
    };
    state.write().busy = true;

    match action {
        ShopAction::Bootstrap => bootstrap(api, state, identity).await,
        ShopAction::AddToCart { product, size, quantity } => {
            let found = state.read().product(product).cloned();
            match found {
                Some(product) => {
                    let result = actions::add_to_cart(api, identity, &cart, &product, &size, quantity).await;
                    settle(state, result, |s, cart| {
                        s.replace_cart(cart);
                        s.set_notice(format!("{} added to cart.", product.name));
                    });
                }
                None => state.write().report_error(&ShopError::NotFound(format!("Product {product}"))),
            }
        }
        ShopAction::UpdateQuantity { item, quantity } => {
            let result = actions::update_cart_quantity(api, identity, item, quantity).await;
            settle(state, result, ShopState::replace_cart);
        }
        ShopAction::RemoveFromCart(item) => {
            let result = actions::remove_from_cart(api, identity, item).await;
            settle(state, result, ShopState::replace_cart);
        }
        ShopAction::ClearCart => {
            let result = actions::clear_cart(api, identity).await;
            settle(state, result, ShopState::replace_cart);
        }
        ShopAction::ToggleFavorite(product) => {
            let result = actions::toggle_favorite(api, identity, &favorites, product).await;
            state.write().finish_favorite_toggle(product);
            settle(state, result, ShopState::replace_favorites);
        }
        ShopAction::RemoveFavorite(product) => {
            let result = actions::remove_favorite(api, identity, &favorites, product).await;
            settle(state, result, ShopState::replace_favorites);
        }
        ShopAction::PlaceOrder(details) => {
            let result = actions::place_order(api, identity, &cart, &details).await;
            settle(state, result, ShopState::order_placed);
        }
        ShopAction::CancelOrder(order) => {
            let result = actions::cancel_order(api, identity, order).await;
            settle(state, result, |s, history| {
                s.replace_orders(history);
                s.set_notice("Order cancelled.");
            });
        }
        ShopAction::RefreshOrders => {
            let result = actions::refresh_orders(api, identity).await;
            settle(state, result, ShopState::replace_orders);
        }
    }

    state.write().busy = false;
}

async fn bootstrap<A: StoreApi>(api: &A, mut state: Signal<ShopState>, identity: Option<TelegramId>) {
    state.write().catalog_loading = true;
    match actions::load_catalog(api).await {
        Ok(products) => {
            let options = actions::load_filter_options(api, &products).await;
            let mut s = state.write();
            s.set_catalog(products);
            s.set_filter_options(options);
        }
        Err(e) => {
            let mut s = state.write();
            s.catalog_loading = false;
            s.report_error(&e);
        }
    }

    // Without an identity the catalog is all there is.
    if identity.is_none() {
        return;
    }
    settle(state, actions::refresh_cart(api, identity).await, ShopState::replace_cart);
    settle(state, actions::refresh_favorites(api, identity).await, ShopState::replace_favorites);
    settle(state, actions::refresh_orders(api, identity).await, ShopState::replace_orders);
}
