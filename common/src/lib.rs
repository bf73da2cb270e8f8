pub mod actions;
pub mod api;
pub mod cart;
pub mod config;
pub mod currency;
pub mod error;
pub mod favorite;
pub mod filter;
pub mod identity;
pub mod order;
pub mod product;
pub mod state;

#[cfg(feature = "http")]
pub mod http;

#[cfg(any(test, feature = "memory"))]
pub mod memory;

pub use error::{Result, ShopError};
