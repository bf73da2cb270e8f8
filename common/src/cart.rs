use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::product::{Product, ProductId};

/// Backend cart line identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartItemId(pub u64);

impl fmt::Display for CartItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One cart line: a product snapshot in a chosen size.
///
/// Quantities are owned by the backend. The client sends changes and then
/// re-reads the whole cart; it never adjusts `quantity` locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub product: Product,
    pub quantity: u32,
    pub selected_size: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartItem {
    /// Saturates at `u64::MAX` rather than wrapping.
    pub fn line_total(&self) -> u64 {
        self.product.price.saturating_mul(u64::from(self.quantity))
    }
}

/// Floor applied by the decrement control: anything below one becomes one.
pub fn clamp_quantity(requested: i64) -> u32 {
    requested.clamp(1, i64::from(u32::MAX)) as u32
}

/// Sum of price × quantity over all lines.
pub fn cart_total(items: &[CartItem]) -> u64 {
    items
        .iter()
        .fold(0u64, |total, item| total.saturating_add(item.line_total()))
}

/// Total number of units in the cart.
pub fn cart_units(items: &[CartItem]) -> u32 {
    items.iter().fold(0u32, |units, item| units.saturating_add(item.quantity))
}

/// The line holding `product` in `size`, if any. The backend keeps at most one.
pub fn find_line<'a>(items: &'a [CartItem], product: ProductId, size: &str) -> Option<&'a CartItem> {
    items
        .iter()
        .find(|item| item.product.id == product && item.selected_size == size)
}
