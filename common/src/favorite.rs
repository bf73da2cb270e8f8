use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::product::{Product, ProductId};

/// Backend favorite identifier (not the product id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteId(pub u64);

impl fmt::Display for FavoriteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: FavoriteId,
    pub product: Product,
    pub created_at: DateTime<Utc>,
}

/// What a favorite toggle has to send, decided from the cached list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteToggle {
    Add,
    Remove(FavoriteId),
}

pub fn find_favorite(favorites: &[Favorite], product: ProductId) -> Option<&Favorite> {
    favorites.iter().find(|fav| fav.product.id == product)
}

pub fn is_favorite(favorites: &[Favorite], product: ProductId) -> bool {
    find_favorite(favorites, product).is_some()
}

pub fn plan_toggle(favorites: &[Favorite], product: ProductId) -> FavoriteToggle {
    match find_favorite(favorites, product) {
        Some(fav) => FavoriteToggle::Remove(fav.id),
        None => FavoriteToggle::Add,
    }
}
