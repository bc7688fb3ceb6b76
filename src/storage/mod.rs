//! Durable state for favorites and recently viewed entries.
//!
//! [`StateStore`] is the raw document backend (filesystem or memory);
//! [`PersistenceStore`] layers the capped, deduplicated list semantics on
//! top and keeps the in-memory copy authoritative when writes fail.
//! [`SearchCache`] lives here too but is never persisted.

pub mod local;
mod persistence;
pub mod search_cache;

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{FavoriteEntry, RecentEntry};
use crate::utils::lock;

// Re-export for convenience
pub use local::LocalStorage;
pub use persistence::{PersistenceStore, RECENT_CAP, dedup_recent, upsert_recent};
pub use search_cache::{CacheKey, CacheLookup, SearchCache};

/// Document persisted per namespace (`stocks`, `news`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub favorites: Vec<FavoriteEntry>,
    /// Most recent first
    #[serde(default)]
    pub recent: Vec<RecentEntry>,
}

/// Trait for state storage backends.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the document for a namespace, `None` if never written.
    async fn load(&self, namespace: &str) -> Result<Option<PersistedState>>;

    /// Replace the document for a namespace.
    async fn save(&self, namespace: &str, state: &PersistedState) -> Result<()>;
}

/// Process-local backend, for tests and for running without a storage dir.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    documents: Mutex<HashMap<String, PersistedState>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStorage {
    async fn load(&self, namespace: &str) -> Result<Option<PersistedState>> {
        Ok(lock(&self.documents).get(namespace).cloned())
    }

    async fn save(&self, namespace: &str, state: &PersistedState) -> Result<()> {
        lock(&self.documents).insert(namespace.to_string(), state.clone());
        Ok(())
    }
}
