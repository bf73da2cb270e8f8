use std::collections::BTreeSet;

use crate::actions::{OrderHistory, OrderPlaced};
use crate::cart::{cart_total, cart_units, CartItem};
use crate::error::ShopError;
use crate::favorite::{is_favorite, Favorite};
use crate::filter::{filter_products, price_bounds, ActiveFilterSet, FilterField, FilterOptions, PriceRange, SearchQuery};
use crate::identity::TelegramId;
use crate::order::{Order, OrderStats};
use crate::product::{Product, ProductId};

/// Overlay panel currently covering the catalog. At most one is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    None,
    Filters,
    Cart,
    Favorites,
    Orders,
    Checkout,
}

/// What the host back button did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackOutcome {
    ClosedProduct,
    ClosedPanel,
    /// Nothing left to close; the host should close the app.
    ExitApp,
}

/// Everything the storefront shows, in one place.
///
/// Server-owned collections (`cart`, `favorites`, `orders`) are only ever
/// replaced wholesale with what the backend returned.
#[derive(Debug, Clone, Default)]
pub struct ShopState {
    pub catalog: Vec<Product>,
    pub filter_options: FilterOptions,
    pub filters: ActiveFilterSet,
    pub search: SearchQuery,
    pub cart: Vec<CartItem>,
    pub favorites: Vec<Favorite>,
    pub orders: Vec<Order>,
    pub order_stats: OrderStats,
    pub identity: Option<TelegramId>,
    pub panel: Panel,
    pub selected_product: Option<ProductId>,
    pub pending_favorites: BTreeSet<ProductId>,
    pub catalog_loading: bool,
    pub busy: bool,
    pub last_error: Option<String>,
    pub notice: Option<String>,
}

impl ShopState {
    pub fn new() -> Self {
        Self {
            catalog_loading: true,
            ..Default::default()
        }
    }

    // Catalog and filtering.

    pub fn set_catalog(&mut self, products: Vec<Product>) {
        self.catalog = products;
        self.catalog_loading = false;
        if let Some(id) = self.selected_product {
            if self.product(id).is_none() {
                self.selected_product = None;
            }
        }
    }

    pub fn set_filter_options(&mut self, options: FilterOptions) {
        self.filter_options = options;
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = SearchQuery::new(text);
    }

    pub fn set_filter(&mut self, field: FilterField, value: impl Into<String>) {
        self.filters.set(field, value);
    }

    pub fn set_price_range(&mut self, range: PriceRange) {
        self.filters.price = range;
    }

    /// Commit the filter panel's draft and close it.
    pub fn apply_filters(&mut self, draft: ActiveFilterSet) {
        self.filters = draft;
        if self.panel == Panel::Filters {
            self.panel = Panel::None;
        }
    }

    pub fn reset_filters(&mut self) {
        self.filters.reset();
    }

    /// The catalog narrowed by the current search and filters. Recomputed
    /// on every call.
    pub fn visible_products(&self) -> Vec<Product> {
        filter_products(&self.catalog, &self.filters, &self.search)
    }

    pub fn catalog_price_bounds(&self) -> Option<PriceRange> {
        price_bounds(&self.catalog)
    }

    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.catalog.iter().find(|p| p.id == id)
    }

    // Navigation.

    pub fn open_panel(&mut self, panel: Panel) {
        self.panel = panel;
    }

    pub fn close_panel(&mut self) {
        self.panel = Panel::None;
    }

    pub fn select_product(&mut self, id: ProductId) {
        self.selected_product = Some(id);
    }

    pub fn close_product(&mut self) {
        self.selected_product = None;
    }

    pub fn selected(&self) -> Option<&Product> {
        self.selected_product.and_then(|id| self.product(id))
    }

    /// Whether the host back button should be visible.
    pub fn can_go_back(&self) -> bool {
        self.selected_product.is_some() || self.panel != Panel::None
    }

    /// Product modal first, then the open panel.
    pub fn back(&mut self) -> BackOutcome {
        if self.selected_product.take().is_some() {
            BackOutcome::ClosedProduct
        } else if self.panel != Panel::None {
            self.panel = Panel::None;
            BackOutcome::ClosedPanel
        } else {
            BackOutcome::ExitApp
        }
    }

    // Server-owned collections.

    pub fn replace_cart(&mut self, cart: Vec<CartItem>) {
        self.cart = cart;
    }

    pub fn replace_favorites(&mut self, favorites: Vec<Favorite>) {
        self.favorites = favorites;
    }

    pub fn replace_orders(&mut self, history: OrderHistory) {
        self.orders = history.orders;
        self.order_stats = history.stats;
    }

    pub fn order_placed(&mut self, placed: OrderPlaced) {
        self.notice = Some(format!("Order {} placed.", placed.order.order_number));
        self.cart = placed.cart;
        self.replace_orders(placed.history);
        self.panel = Panel::Orders;
    }

    pub fn cart_count(&self) -> u32 {
        cart_units(&self.cart)
    }

    pub fn cart_total(&self) -> u64 {
        cart_total(&self.cart)
    }

    pub fn favorites_count(&self) -> usize {
        self.favorites.len()
    }

    pub fn is_favorite(&self, product: ProductId) -> bool {
        is_favorite(&self.favorites, product)
    }

    // Favorite toggles: one request per product at a time.

    /// Marks a toggle as in flight. False if one already is.
    pub fn begin_favorite_toggle(&mut self, product: ProductId) -> bool {
        self.pending_favorites.insert(product)
    }

    pub fn finish_favorite_toggle(&mut self, product: ProductId) {
        self.pending_favorites.remove(&product);
    }

    pub fn favorite_pending(&self, product: ProductId) -> bool {
        self.pending_favorites.contains(&product)
    }

    // Errors and notices.

    pub fn report_error(&mut self, error: &ShopError) {
        self.last_error = Some(error.user_message());
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    pub fn set_notice(&mut self, text: impl Into<String>) {
        self.notice = Some(text.into());
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }
}
