// src/storage/persistence.rs

//! Capped favorites/recents store mirrored to a [`StateStore`].

use std::sync::{Arc, Mutex};

use crate::models::{FavoriteEntry, RecentEntry};
use crate::storage::{PersistedState, StateStore};
use crate::utils::lock;

/// Longest recents list kept.
pub const RECENT_CAP: usize = 5;

/// Move `entry` to the front, dropping any older entry with the same key,
/// and truncate to [`RECENT_CAP`].
pub fn upsert_recent(list: &mut Vec<RecentEntry>, entry: RecentEntry) {
    list.retain(|e| e.key() != entry.key());
    list.insert(0, entry);
    list.truncate(RECENT_CAP);
}

/// Keep the first occurrence of each key, capped at [`RECENT_CAP`].
pub fn dedup_recent(entries: impl IntoIterator<Item = RecentEntry>) -> Vec<RecentEntry> {
    let mut out: Vec<RecentEntry> = Vec::with_capacity(RECENT_CAP);
    for entry in entries {
        if out.len() == RECENT_CAP {
            break;
        }
        if !out.iter().any(|e| e.key() == entry.key()) {
            out.push(entry);
        }
    }
    out
}

/// Favorites and recents for one screen.
///
/// Mutations apply to memory first and are then written through. A failed
/// write is logged and otherwise ignored.
pub struct PersistenceStore {
    backend: Arc<dyn StateStore>,
    namespace: String,
    state: Mutex<PersistedState>,
    // Serializes write-through so the last mutation is the last write.
    write_gate: tokio::sync::Mutex<()>,
}

impl PersistenceStore {
    /// Load the namespace document, starting empty if it is missing or
    /// unreadable.
    pub async fn open(backend: Arc<dyn StateStore>, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let state = match backend.load(&namespace).await {
            Ok(Some(mut state)) => {
                state.recent = dedup_recent(state.recent);
                state
            }
            Ok(None) => PersistedState::default(),
            Err(e) => {
                log::warn!("Could not load persisted state '{namespace}': {e}. Starting empty.");
                PersistedState::default()
            }
        };

        Self {
            backend,
            namespace,
            state: Mutex::new(state),
            write_gate: tokio::sync::Mutex::new(()),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn list_recent(&self) -> Vec<RecentEntry> {
        lock(&self.state).recent.clone()
    }

    pub fn list_favorites(&self) -> Vec<FavoriteEntry> {
        lock(&self.state).favorites.clone()
    }

    pub fn is_favorite(&self, code: &str) -> bool {
        lock(&self.state).favorites.iter().any(|f| f.code == code)
    }

    pub async fn upsert_recent(&self, entry: RecentEntry) -> Vec<RecentEntry> {
        let recent = {
            let mut state = lock(&self.state);
            upsert_recent(&mut state.recent, entry);
            state.recent.clone()
        };
        self.flush().await;
        recent
    }

    /// Replace recents wholesale, deduplicated and capped.
    pub async fn replace_recent(&self, entries: Vec<RecentEntry>) -> Vec<RecentEntry> {
        let recent = {
            let mut state = lock(&self.state);
            state.recent = dedup_recent(entries);
            state.recent.clone()
        };
        self.flush().await;
        recent
    }

    /// Returns false when the code was already a favorite.
    pub async fn add_favorite(&self, entry: FavoriteEntry) -> bool {
        let added = {
            let mut state = lock(&self.state);
            if state.favorites.iter().any(|f| f.code == entry.code) {
                false
            } else {
                state.favorites.push(entry);
                true
            }
        };
        if added {
            self.flush().await;
        }
        added
    }

    /// Returns false when the code was not a favorite.
    pub async fn remove_favorite(&self, code: &str) -> bool {
        let removed = {
            let mut state = lock(&self.state);
            let before = state.favorites.len();
            state.favorites.retain(|f| f.code != code);
            state.favorites.len() != before
        };
        if removed {
            self.flush().await;
        }
        removed
    }

    pub async fn replace_favorites(&self, entries: Vec<FavoriteEntry>) {
        lock(&self.state).favorites = entries;
        self.flush().await;
    }

    async fn flush(&self) {
        let _gate = self.write_gate.lock().await;
        let snapshot = lock(&self.state).clone();
        if let Err(e) = self.backend.save(&self.namespace, &snapshot).await {
            log::warn!(
                "Failed to persist '{}' state, keeping it in memory: {}",
                self.namespace,
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::{AppError, Result};
    use crate::models::fixtures;
    use crate::storage::MemoryStorage;

    fn recent(code: &str) -> RecentEntry {
        RecentEntry::from(&fixtures::stock(code, code))
    }

    fn codes(list: &[RecentEntry]) -> Vec<&str> {
        list.iter().map(|e| e.code.as_str()).collect()
    }

    struct FailingStore;

    #[async_trait]
    impl StateStore for FailingStore {
        async fn load(&self, _namespace: &str) -> Result<Option<PersistedState>> {
            Err(AppError::validation("disk gone"))
        }

        async fn save(&self, _namespace: &str, _state: &PersistedState) -> Result<()> {
            Err(AppError::validation("disk gone"))
        }
    }

    #[test]
    fn test_upsert_moves_existing_to_front() {
        let mut list = vec![recent("a"), recent("b"), recent("c")];
        upsert_recent(&mut list, recent("c"));
        assert_eq!(codes(&list), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_upsert_caps_at_five() {
        let mut list = Vec::new();
        for code in ["a", "b", "c", "d", "e", "f", "g"] {
            upsert_recent(&mut list, recent(code));
            assert!(list.len() <= RECENT_CAP);
        }
        assert_eq!(codes(&list), vec!["g", "f", "e", "d", "c"]);
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let list = dedup_recent(
            ["a", "b", "a", "c", "b", "d", "e", "f"]
                .into_iter()
                .map(recent),
        );
        assert_eq!(codes(&list), vec!["a", "b", "c", "d", "e"]);
    }

    #[tokio::test]
    async fn test_store_reloads_from_backend() {
        let backend: Arc<dyn StateStore> = Arc::new(MemoryStorage::new());

        let store = PersistenceStore::open(Arc::clone(&backend), "stocks").await;
        store.upsert_recent(recent("a")).await;
        store.upsert_recent(recent("b")).await;
        assert!(
            store
                .add_favorite(FavoriteEntry {
                    code: "a".into(),
                    name: "A".into()
                })
                .await
        );

        let reopened = PersistenceStore::open(backend, "stocks").await;
        assert_eq!(codes(&reopened.list_recent()), vec!["b", "a"]);
        assert!(reopened.is_favorite("a"));
    }

    #[tokio::test]
    async fn test_favorites_dedup_and_remove() {
        let store = PersistenceStore::open(Arc::new(MemoryStorage::new()), "stocks").await;
        let entry = FavoriteEntry {
            code: "005930".into(),
            name: "삼성전자".into(),
        };

        assert!(store.add_favorite(entry.clone()).await);
        assert!(!store.add_favorite(entry).await);
        assert_eq!(store.list_favorites().len(), 1);

        assert!(store.remove_favorite("005930").await);
        assert!(!store.remove_favorite("005930").await);
        assert!(store.list_favorites().is_empty());
    }

    #[tokio::test]
    async fn test_write_failure_keeps_memory_state() {
        let store = PersistenceStore::open(Arc::new(FailingStore), "news").await;
        store.upsert_recent(recent("a")).await;
        store.upsert_recent(recent("b")).await;

        assert_eq!(codes(&store.list_recent()), vec!["b", "a"]);
    }
}
