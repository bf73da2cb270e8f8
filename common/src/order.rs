use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::product::{de_amount, null_as_default, Product};

/// Backend order identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order lifecycle as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Only orders nobody has confirmed yet can be cancelled by the customer.
    pub fn can_cancel(self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Awaiting confirmation",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

/// A product line frozen into an order at the price paid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: u64,
    pub product: Product,
    pub quantity: u32,
    #[serde(deserialize_with = "de_amount")]
    pub price: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub selected_size: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub order_number: String,
    pub status: OrderStatus,
    #[serde(deserialize_with = "de_amount")]
    pub total_amount: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub shipping_address: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone_number: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

/// Aggregates served by `orders/stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderStats {
    pub total_orders: u32,
    #[serde(deserialize_with = "de_amount")]
    pub total_spent: u64,
    pub pending_orders: u32,
    pub completed_orders: u32,
}

impl OrderStats {
    /// Same aggregates computed from an order list; delivered counts as
    /// completed.
    pub fn from_orders(orders: &[Order]) -> Self {
        orders.iter().fold(Self::default(), |mut stats, order| {
            stats.total_orders = stats.total_orders.saturating_add(1);
            stats.total_spent = stats.total_spent.saturating_add(order.total_amount);
            match order.status {
                OrderStatus::Pending => stats.pending_orders = stats.pending_orders.saturating_add(1),
                OrderStatus::Delivered => stats.completed_orders = stats.completed_orders.saturating_add(1),
                _ => {}
            }
            stats
        })
    }
}

/// Checkout form contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShippingDetails {
    pub shipping_address: String,
    pub phone_number: String,
    pub notes: String,
}

const PHONE_DIGITS: std::ops::RangeInclusive<usize> = 5..=20;

impl ShippingDetails {
    /// Checks the fields the backend requires, returning the reason shown
    /// to the user on failure.
    pub fn validate(&self) -> Result<(), String> {
        if self.shipping_address.trim().is_empty() {
            return Err("Enter a delivery address.".into());
        }
        let phone = self.phone_number.trim();
        if phone.is_empty() {
            return Err("Enter a contact phone number.".into());
        }
        let mut digits = 0usize;
        for ch in phone.chars() {
            match ch {
                '0'..='9' => digits += 1,
                '+' | '-' | '(' | ')' | ' ' => {}
                _ => return Err("The phone number may only contain digits, spaces and + - ( ).".into()),
            }
        }
        if !PHONE_DIGITS.contains(&digits) {
            return Err("The phone number looks too short or too long.".into());
        }
        Ok(())
    }

    /// Trimmed copy sent to the backend.
    pub fn normalized(&self) -> Self {
        Self {
            shipping_address: self.shipping_address.trim().to_string(),
            phone_number: self.phone_number.trim().to_string(),
            notes: self.notes.trim().to_string(),
        }
    }
}
