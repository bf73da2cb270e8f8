//! In-process [`StoreApi`] with the backend's rules, for offline demos
//! and tests.
//!
//! Single-threaded: state sits in a `RefCell` and no borrow is held across
//! an await point.

use std::cell::RefCell;

use chrono::Utc;

use crate::api::{AddCartItem, AddFavorite, CatalogQuery, CreateOrder, RegisterUser, StoreApi, UserProfile};
use crate::cart::{CartItem, CartItemId};
use crate::error::{Result, ShopError};
use crate::favorite::{Favorite, FavoriteId};
use crate::filter::{FilterField, FilterOptions};
use crate::identity::TelegramId;
use crate::order::{Order, OrderId, OrderItem, OrderStats, OrderStatus};
use crate::product::{Badge, ImageRef, Product, ProductId, SizeSet};

/// Names a [`StoreApi`] call, for failure injection and call tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListProducts,
    Product,
    FilterOptions,
    Cart,
    AddCartItem,
    UpdateCartItem,
    RemoveCartItem,
    ClearCart,
    Favorites,
    AddFavorite,
    RemoveFavorite,
    CheckFavorite,
    CreateOrder,
    Orders,
    OrderStats,
    CancelOrder,
    RegisterUser,
}

#[derive(Debug, Default)]
struct Inner {
    products: Vec<Product>,
    users: Vec<UserProfile>,
    cart: Vec<(TelegramId, CartItem)>,
    favorites: Vec<(TelegramId, Favorite)>,
    orders: Vec<(TelegramId, Order)>,
    next_id: u64,
    failures: Vec<Operation>,
    calls: Vec<Operation>,
}

impl Inner {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Users appear on first cart or favorite write, like the backend's
    /// get-or-create.
    fn ensure_user(&mut self, telegram_id: TelegramId) {
        if !self.has_user(telegram_id) {
            let id = self.next_id();
            self.users.push(UserProfile {
                id,
                telegram_id: Some(telegram_id),
                username: None,
                first_name: None,
                last_name: None,
                phone_number: None,
            });
        }
    }

    fn has_user(&self, telegram_id: TelegramId) -> bool {
        self.users.iter().any(|u| u.telegram_id == Some(telegram_id))
    }

    fn require_user(&self, telegram_id: TelegramId) -> Result<()> {
        if self.has_user(telegram_id) {
            Ok(())
        } else {
            Err(not_found("User not found"))
        }
    }

    fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    fn product_mut(&mut self, id: ProductId) -> Option<&mut Product> {
        self.products.iter_mut().find(|p| p.id == id)
    }
}

fn bad_request(message: impl Into<String>) -> ShopError {
    ShopError::Http {
        status: 400,
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> ShopError {
    ShopError::Http {
        status: 404,
        message: message.into(),
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RefCell<Inner>,
}

impl MemoryStore {
    pub fn new(products: Vec<Product>) -> Self {
        let next_id = products.iter().map(|p| p.id.0).max().unwrap_or(0);
        Self {
            inner: RefCell::new(Inner {
                products,
                next_id,
                ..Default::default()
            }),
        }
    }

    /// Store seeded with [`demo_catalog`].
    pub fn demo() -> Self {
        Self::new(demo_catalog())
    }

    /// Make the next call of `operation` fail with a 500.
    pub fn fail_next(&self, operation: Operation) {
        self.inner.borrow_mut().failures.push(operation);
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<Operation> {
        self.inner.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.borrow_mut().calls.clear();
    }

    pub fn products(&self) -> Vec<Product> {
        self.inner.borrow().products.clone()
    }

    /// Staff-side status change (confirm, ship, deliver).
    pub fn set_order_status(&self, id: OrderId, status: OrderStatus) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        let (_, order) = inner
            .orders
            .iter_mut()
            .find(|(_, o)| o.id == id)
            .ok_or_else(|| not_found("Order not found"))?;
        order.status = status;
        Ok(())
    }

    fn enter(&self, operation: Operation) -> Result<std::cell::RefMut<'_, Inner>> {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(operation);
        if let Some(pos) = inner.failures.iter().position(|op| *op == operation) {
            inner.failures.remove(pos);
            tracing::debug!("injected failure for {operation:?}");
            return Err(ShopError::Http {
                status: 500,
                message: "Internal Server Error".into(),
            });
        }
        Ok(inner)
    }
}

/// Case-insensitive containment, as the backend's `icontains` lookups.
fn icontains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn query_accepts(query: &CatalogQuery, product: &Product) -> bool {
    let field_ok = FilterField::ALL.iter().all(|field| match query.filter(*field) {
        None => true,
        Some(value) => match field {
            FilterField::KitType => icontains(&product.kit_type, value),
            FilterField::Manufacturer => icontains(&product.manufacturer, value),
            FilterField::League => icontains(&product.league, value),
            FilterField::Season => icontains(&product.season, value),
            FilterField::Condition => icontains(&product.condition, value),
            FilterField::Size => icontains(&product.sizes.to_string(), value),
        },
    });
    let search = query.search.trim();
    let search_ok = search.is_empty()
        || [&product.team, &product.manufacturer, &product.season, &product.kit_type]
            .iter()
            .any(|text| icontains(text, search));
    field_ok && search_ok && query.filters.price.contains(product.price)
}

impl StoreApi for MemoryStore {
    async fn list_products(&self, query: &CatalogQuery) -> Result<Vec<Product>> {
        let inner = self.enter(Operation::ListProducts)?;
        Ok(inner
            .products
            .iter()
            .filter(|p| query_accepts(query, p))
            .cloned()
            .collect())
    }

    async fn product(&self, id: ProductId) -> Result<Product> {
        let inner = self.enter(Operation::Product)?;
        inner
            .product(id)
            .filter(|p| p.is_available)
            .cloned()
            .ok_or_else(|| not_found("Not found."))
    }

    async fn filter_options(&self) -> Result<FilterOptions> {
        let inner = self.enter(Operation::FilterOptions)?;
        let available: Vec<Product> = inner.products.iter().filter(|p| p.is_available).cloned().collect();
        Ok(FilterOptions::from_products(&available))
    }

    async fn cart(&self, user: TelegramId) -> Result<Vec<CartItem>> {
        let inner = self.enter(Operation::Cart)?;
        Ok(inner
            .cart
            .iter()
            .filter(|(owner, _)| *owner == user)
            .map(|(_, item)| item.clone())
            .collect())
    }

    async fn add_cart_item(&self, request: &AddCartItem) -> Result<()> {
        let mut inner = self.enter(Operation::AddCartItem)?;
        let product = inner
            .product(request.product)
            .cloned()
            .ok_or_else(|| bad_request(format!("Invalid pk \"{}\" - object does not exist.", request.product)))?;
        if request.quantity == 0 {
            return Err(bad_request("quantity: Ensure this value is greater than or equal to 1."));
        }
        let duplicate = inner.cart.iter().any(|(owner, item)| {
            *owner == request.telegram_id
                && item.product.id == request.product
                && item.selected_size == request.selected_size
        });
        if duplicate {
            return Err(bad_request("The fields user, product, selected_size must make a unique set."));
        }
        inner.ensure_user(request.telegram_id);
        let id = CartItemId(inner.next_id());
        let now = Utc::now();
        inner.cart.push((
            request.telegram_id,
            CartItem {
                id,
                product,
                quantity: request.quantity,
                selected_size: request.selected_size.clone(),
                created_at: now,
                updated_at: now,
            },
        ));
        Ok(())
    }

    async fn update_cart_item(&self, user: TelegramId, id: CartItemId, quantity: u32) -> Result<()> {
        let mut inner = self.enter(Operation::UpdateCartItem)?;
        if quantity == 0 {
            return Err(bad_request("quantity: Ensure this value is greater than or equal to 1."));
        }
        let (_, item) = inner
            .cart
            .iter_mut()
            .find(|(owner, item)| *owner == user && item.id == id)
            .ok_or_else(|| not_found("Not found."))?;
        item.quantity = quantity;
        item.updated_at = Utc::now();
        Ok(())
    }

    async fn remove_cart_item(&self, user: TelegramId, id: CartItemId) -> Result<()> {
        let mut inner = self.enter(Operation::RemoveCartItem)?;
        let pos = inner
            .cart
            .iter()
            .position(|(owner, item)| *owner == user && item.id == id)
            .ok_or_else(|| not_found("Not found."))?;
        inner.cart.remove(pos);
        Ok(())
    }

    async fn clear_cart(&self, user: TelegramId) -> Result<()> {
        let mut inner = self.enter(Operation::ClearCart)?;
        inner.require_user(user)?;
        inner.cart.retain(|(owner, _)| *owner != user);
        Ok(())
    }

    async fn favorites(&self, user: TelegramId) -> Result<Vec<Favorite>> {
        let inner = self.enter(Operation::Favorites)?;
        Ok(inner
            .favorites
            .iter()
            .filter(|(owner, _)| *owner == user)
            .map(|(_, fav)| fav.clone())
            .collect())
    }

    async fn add_favorite(&self, request: &AddFavorite) -> Result<()> {
        let mut inner = self.enter(Operation::AddFavorite)?;
        let product = inner
            .product(request.product)
            .cloned()
            .ok_or_else(|| bad_request(format!("Invalid pk \"{}\" - object does not exist.", request.product)))?;
        let duplicate = inner
            .favorites
            .iter()
            .any(|(owner, fav)| *owner == request.telegram_id && fav.product.id == request.product);
        if duplicate {
            return Err(bad_request("The fields user, product must make a unique set."));
        }
        inner.ensure_user(request.telegram_id);
        let id = FavoriteId(inner.next_id());
        inner.favorites.push((
            request.telegram_id,
            Favorite {
                id,
                product,
                created_at: Utc::now(),
            },
        ));
        Ok(())
    }

    async fn remove_favorite(&self, user: TelegramId, id: FavoriteId) -> Result<()> {
        let mut inner = self.enter(Operation::RemoveFavorite)?;
        let pos = inner
            .favorites
            .iter()
            .position(|(owner, fav)| *owner == user && fav.id == id)
            .ok_or_else(|| not_found("Not found."))?;
        inner.favorites.remove(pos);
        Ok(())
    }

    async fn check_favorite(&self, user: TelegramId, product: ProductId) -> Result<bool> {
        let inner = self.enter(Operation::CheckFavorite)?;
        Ok(inner
            .favorites
            .iter()
            .any(|(owner, fav)| *owner == user && fav.product.id == product))
    }

    async fn create_order(&self, request: &CreateOrder) -> Result<Order> {
        let mut inner = self.enter(Operation::CreateOrder)?;
        if request.shipping_address.trim().is_empty() || request.phone_number.trim().is_empty() {
            return Err(bad_request("shipping_address and phone_number are required"));
        }
        inner.require_user(request.telegram_id)?;
        let lines: Vec<CartItem> = inner
            .cart
            .iter()
            .filter(|(owner, _)| *owner == request.telegram_id)
            .map(|(_, item)| item.clone())
            .collect();
        if lines.is_empty() {
            return Err(bad_request("Cart is empty"));
        }

        // Validate everything before touching stock.
        let mut items = Vec::with_capacity(lines.len());
        let mut total = 0u64;
        for line in &lines {
            let product = inner
                .product(line.product.id)
                .ok_or_else(|| bad_request(format!("Product '{}' is no longer available", line.product.team)))?;
            if !product.is_available {
                return Err(bad_request(format!("Product '{}' is no longer available", product.team)));
            }
            if product.stock_quantity < i64::from(line.quantity) {
                return Err(bad_request(format!("Not enough '{}' in stock", product.team)));
            }
            total = total.saturating_add(product.price.saturating_mul(u64::from(line.quantity)));
            items.push((product.clone(), line.quantity, line.selected_size.clone()));
        }

        let mut order_items = Vec::with_capacity(items.len());
        for (product, quantity, selected_size) in items {
            if let Some(stock) = inner.product_mut(product.id) {
                stock.stock_quantity -= i64::from(quantity);
                if stock.stock_quantity <= 0 {
                    stock.is_available = false;
                }
            }
            let id = inner.next_id();
            order_items.push(OrderItem {
                id,
                price: product.price,
                product,
                quantity,
                selected_size,
            });
        }

        let id = inner.next_id();
        let order = Order {
            id: OrderId(id),
            order_number: format!("ORD-{id:08X}"),
            status: OrderStatus::Pending,
            total_amount: total,
            shipping_address: request.shipping_address.clone(),
            phone_number: request.phone_number.clone(),
            notes: request.notes.clone(),
            created_at: Utc::now(),
            items: order_items,
        };
        inner.orders.push((request.telegram_id, order.clone()));
        inner.cart.retain(|(owner, _)| *owner != request.telegram_id);
        Ok(order)
    }

    async fn orders(&self, user: TelegramId) -> Result<Vec<Order>> {
        let inner = self.enter(Operation::Orders)?;
        Ok(inner
            .orders
            .iter()
            .filter(|(owner, _)| *owner == user)
            .map(|(_, order)| order.clone())
            .collect())
    }

    async fn order_stats(&self, user: TelegramId) -> Result<OrderStats> {
        let inner = self.enter(Operation::OrderStats)?;
        inner.require_user(user)?;
        let mine: Vec<Order> = inner
            .orders
            .iter()
            .filter(|(owner, _)| *owner == user)
            .map(|(_, o)| o.clone())
            .collect();
        Ok(OrderStats::from_orders(&mine))
    }

    async fn cancel_order(&self, user: TelegramId, id: OrderId) -> Result<String> {
        let mut inner = self.enter(Operation::CancelOrder)?;
        inner.require_user(user)?;
        let order = inner
            .orders
            .iter()
            .find(|(owner, o)| *owner == user && o.id == id)
            .map(|(_, o)| o.clone())
            .ok_or_else(|| not_found("Order not found"))?;
        if !order.status.can_cancel() {
            return Err(bad_request("Order cannot be cancelled"));
        }
        for item in &order.items {
            if let Some(product) = inner.product_mut(item.product.id) {
                product.stock_quantity += i64::from(item.quantity);
                if product.stock_quantity > 0 {
                    product.is_available = true;
                }
            }
        }
        if let Some((_, stored)) = inner.orders.iter_mut().find(|(_, o)| o.id == id) {
            stored.status = OrderStatus::Cancelled;
        }
        Ok("Order cancelled".into())
    }

    async fn register_user(&self, request: &RegisterUser) -> Result<UserProfile> {
        let mut inner = self.enter(Operation::RegisterUser)?;
        inner.ensure_user(request.telegram_id);
        let user = inner
            .users
            .iter_mut()
            .find(|u| u.telegram_id == Some(request.telegram_id))
            .ok_or_else(|| not_found("User not found"))?;
        user.username = request.username.clone();
        user.first_name = request.first_name.clone();
        user.last_name = request.last_name.clone();
        user.phone_number = request.phone_number.clone();
        Ok(user.clone())
    }
}

struct Kit {
    id: u64,
    team: &'static str,
    manufacturer: &'static str,
    league: &'static str,
    kit_type: &'static str,
    season: &'static str,
    condition: &'static str,
    price: u64,
    sizes: &'static str,
    color: &'static str,
    stock: i64,
}

impl Kit {
    fn into_product(self) -> Product {
        let mut badges = Vec::new();
        if self.condition == "New" {
            badges.push(Badge {
                kind: "condition".into(),
                value: self.condition.into(),
            });
        }
        badges.push(Badge {
            kind: "brand".into(),
            value: self.manufacturer.into(),
        });
        badges.push(Badge {
            kind: "season".into(),
            value: self.season.into(),
        });
        Product {
            id: ProductId(self.id),
            name: format!("{} ({})", self.team, self.season),
            team: self.team.into(),
            manufacturer: self.manufacturer.into(),
            league: self.league.into(),
            kit_type: self.kit_type.into(),
            season: self.season.into(),
            condition: self.condition.into(),
            price: self.price,
            sizes: SizeSet::parse(self.sizes),
            color: self.color.into(),
            description: format!("{} {} kit, {} season.", self.team, self.kit_type.to_lowercase(), self.season),
            images: vec![ImageRef(format!("/assets/kits/{}.jpg", self.id))],
            badges,
            is_available: self.stock > 0,
            stock_quantity: self.stock,
        }
    }
}

/// Small fixed catalog for the offline build.
pub fn demo_catalog() -> Vec<Product> {
    [
        Kit {
            id: 1,
            team: "Barcelona",
            manufacturer: "Nike",
            league: "La Liga",
            kit_type: "Home",
            season: "2023/24",
            condition: "New",
            price: 6500,
            sizes: "M",
            color: "Blue and garnet",
            stock: 5,
        },
        Kit {
            id: 2,
            team: "Argentina",
            manufacturer: "Adidas",
            league: "National teams",
            kit_type: "Home",
            season: "2022",
            condition: "New",
            price: 7000,
            sizes: "L",
            color: "Sky blue and white",
            stock: 3,
        },
        Kit {
            id: 3,
            team: "Manchester United",
            manufacturer: "Adidas",
            league: "Premier League",
            kit_type: "Home",
            season: "2023/24",
            condition: "New",
            price: 8000,
            sizes: "S, M, L",
            color: "Red",
            stock: 7,
        },
        Kit {
            id: 4,
            team: "Brazil",
            manufacturer: "Nike",
            league: "National teams",
            kit_type: "Away",
            season: "2022",
            condition: "Used",
            price: 5500,
            sizes: "M, L",
            color: "Blue",
            stock: 1,
        },
        Kit {
            id: 5,
            team: "Real Madrid",
            manufacturer: "Adidas",
            league: "La Liga",
            kit_type: "Away",
            season: "2023/24",
            condition: "New",
            price: 7000,
            sizes: "S/M/L/XL",
            color: "White",
            stock: 4,
        },
    ]
    .into_iter()
    .map(Kit::into_product)
    .collect()
}
