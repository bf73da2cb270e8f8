use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShopError};

/// Telegram user id. Cart, favorites and orders are keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TelegramId(pub i64);

impl fmt::Display for TelegramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TelegramId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim().parse().map(TelegramId)
    }
}

/// User record handed over by the Telegram host (`initDataUnsafe.user`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostUser {
    pub id: TelegramId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Persistent slot for the last known identity.
pub trait IdentityCache {
    fn load(&self) -> Option<TelegramId>;
    fn store(&mut self, id: TelegramId);
}

/// Process-local cache, used natively and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryIdentityCache(Option<TelegramId>);

impl MemoryIdentityCache {
    pub fn with(id: TelegramId) -> Self {
        Self(Some(id))
    }
}

impl IdentityCache for MemoryIdentityCache {
    fn load(&self) -> Option<TelegramId> {
        self.0
    }

    fn store(&mut self, id: TelegramId) {
        self.0 = Some(id);
    }
}

/// Host identity first (remembered for later sessions), then the cached one.
pub fn resolve_identity(host: Option<TelegramId>, cache: &mut impl IdentityCache) -> Option<TelegramId> {
    match host {
        Some(id) => {
            if cache.load() != Some(id) {
                cache.store(id);
            }
            Some(id)
        }
        None => cache.load(),
    }
}

/// Gate for every identity-dependent action; fails before any request is made.
pub fn require_identity(identity: Option<TelegramId>) -> Result<TelegramId> {
    identity.ok_or(ShopError::MissingIdentity)
}
