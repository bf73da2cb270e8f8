//! [`StoreApi`] over HTTP with reqwest. Works natively and on wasm32,
//! where reqwest rides on the browser's fetch.

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::api::{
    paths, AddCartItem, AddFavorite, CancelOrder, CatalogQuery, CreateOrder, FavoriteCheck, MessageReply,
    RegisterUser, StoreApi, UpdateCartItem, UserProfile,
};
use crate::cart::{CartItem, CartItemId};
use crate::config::ApiConfig;
use crate::error::{Result, ShopError};
use crate::favorite::{Favorite, FavoriteId};
use crate::filter::FilterOptions;
use crate::identity::TelegramId;
use crate::order::{Order, OrderId, OrderStats};
use crate::product::{Product, ProductId};

/// Longest raw body echoed into an error when the backend sends no
/// `error`/`detail` field.
const MAX_ERROR_BODY: usize = 200;

#[derive(Debug, Clone)]
pub struct HttpStoreApi {
    client: reqwest::Client,
    config: ApiConfig,
}

impl HttpStoreApi {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_family = "wasm"))]
        let builder = builder.timeout(config.timeout);
        let client = builder.build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.config.endpoint(path);
        tracing::debug!("{method} {url}");
        self.client.request(method, url)
    }

    fn for_user(&self, method: Method, path: &str, user: TelegramId) -> RequestBuilder {
        self.request(method, path).query(&[("telegram_id", user.to_string())])
    }

    async fn send(request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);
        tracing::debug!("store api answered {status}: {message}");
        Err(ShopError::Http {
            status: status.as_u16(),
            message,
        })
    }

    async fn json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        let response = Self::send(request).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// For calls whose reply body is not used; 204 or any 2xx body.
    async fn no_content(request: RequestBuilder) -> Result<()> {
        let response = Self::send(request).await?;
        if response.status() != StatusCode::NO_CONTENT {
            response.bytes().await?;
        }
        Ok(())
    }
}

/// Pull a human-readable message out of a backend error body.
///
/// The backend answers with `{"error": ".."}` from its own views and
/// `{"detail": ".."}` from the framework (404, 405). Validation failures
/// are a map of field name to message list; the first message is used.
fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct Wire {
        error: Option<String>,
        detail: Option<String>,
    }

    if let Ok(Wire { error, detail }) = serde_json::from_str::<Wire>(body) {
        if let Some(message) = error.or(detail) {
            return message;
        }
    }
    if let Ok(serde_json::Value::Object(fields)) = serde_json::from_str::<serde_json::Value>(body) {
        let first = fields.iter().find_map(|(field, value)| match value {
            serde_json::Value::Array(list) => list.first().and_then(|v| v.as_str()).map(|m| format!("{field}: {m}")),
            serde_json::Value::String(m) => Some(format!("{field}: {m}")),
            _ => None,
        });
        if let Some(message) = first {
            return message;
        }
    }
    body.trim().chars().take(MAX_ERROR_BODY).collect()
}

impl StoreApi for HttpStoreApi {
    async fn list_products(&self, query: &CatalogQuery) -> Result<Vec<Product>> {
        let request = self.request(Method::GET, paths::PRODUCTS).query(&query.pairs());
        Self::json(request).await
    }

    async fn product(&self, id: ProductId) -> Result<Product> {
        Self::json(self.request(Method::GET, &paths::product(id))).await
    }

    async fn filter_options(&self) -> Result<FilterOptions> {
        Self::json(self.request(Method::GET, paths::FILTER_OPTIONS)).await
    }

    async fn cart(&self, user: TelegramId) -> Result<Vec<CartItem>> {
        Self::json(self.for_user(Method::GET, paths::CART_BY_USER, user)).await
    }

    async fn add_cart_item(&self, request: &AddCartItem) -> Result<()> {
        Self::no_content(self.request(Method::POST, paths::CART).json(request)).await
    }

    async fn update_cart_item(&self, user: TelegramId, id: CartItemId, quantity: u32) -> Result<()> {
        let body = UpdateCartItem { quantity };
        Self::no_content(self.for_user(Method::PATCH, &paths::cart_item(id), user).json(&body)).await
    }

    async fn remove_cart_item(&self, user: TelegramId, id: CartItemId) -> Result<()> {
        Self::no_content(self.for_user(Method::DELETE, &paths::cart_item(id), user)).await
    }

    async fn clear_cart(&self, user: TelegramId) -> Result<()> {
        Self::no_content(self.for_user(Method::DELETE, paths::CART_CLEAR, user)).await
    }

    async fn favorites(&self, user: TelegramId) -> Result<Vec<Favorite>> {
        Self::json(self.for_user(Method::GET, paths::FAVORITES_BY_USER, user)).await
    }

    async fn add_favorite(&self, request: &AddFavorite) -> Result<()> {
        Self::no_content(self.request(Method::POST, paths::FAVORITES).json(request)).await
    }

    async fn remove_favorite(&self, user: TelegramId, id: FavoriteId) -> Result<()> {
        Self::no_content(self.for_user(Method::DELETE, &paths::favorite(id), user)).await
    }

    async fn check_favorite(&self, user: TelegramId, product: ProductId) -> Result<bool> {
        let check: FavoriteCheck = Self::json(self.for_user(Method::GET, &paths::favorite_check(product), user)).await?;
        Ok(check.is_favorite)
    }

    async fn create_order(&self, request: &CreateOrder) -> Result<Order> {
        Self::json(self.request(Method::POST, paths::ORDER_FROM_CART).json(request)).await
    }

    async fn orders(&self, user: TelegramId) -> Result<Vec<Order>> {
        Self::json(self.for_user(Method::GET, paths::ORDERS, user)).await
    }

    async fn order_stats(&self, user: TelegramId) -> Result<OrderStats> {
        Self::json(self.for_user(Method::GET, paths::ORDER_STATS, user)).await
    }

    async fn cancel_order(&self, user: TelegramId, id: OrderId) -> Result<String> {
        let body = CancelOrder { telegram_id: user };
        let reply: MessageReply = Self::json(self.request(Method::POST, &paths::order_cancel(id)).json(&body)).await?;
        Ok(reply.message)
    }

    async fn register_user(&self, request: &RegisterUser) -> Result<UserProfile> {
        Self::json(self.request(Method::POST, paths::REGISTER_USER).json(request)).await
    }
}
