//! Local filesystem storage implementation.
//!
//! One pretty-printed JSON document per namespace:
//!
//! ```text
//! {root}/
//! ├── config.toml     # Optional configuration
//! ├── stocks.json     # Stock screen favorites + recents
//! └── news.json       # News screen favorites + recents
//! ```
//!
//! Writes go to a `.tmp` sibling first and are renamed into place; a
//! crash mid-write leaves the previous document intact.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::storage::{PersistedState, StateStore};

/// Directory of per-namespace JSON documents.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    fn document_path(&self, namespace: &str) -> PathBuf {
        self.root_dir.join(format!("{namespace}.json"))
    }

    /// Replace `path` with `bytes` via a `.tmp` sibling and a rename.
    async fn replace_file(path: &Path, bytes: &[u8]) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await?;
        }

        let staging = path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&staging).await?;
            file.write_all(bytes).await?;
            file.sync_all().await?;
        }
        fs::rename(&staging, path).await?;
        Ok(())
    }

    async fn read_file(path: &Path) -> Result<Option<Vec<u8>>> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[async_trait]
impl StateStore for LocalStorage {
    async fn load(&self, namespace: &str) -> Result<Option<PersistedState>> {
        let path = self.document_path(namespace);
        let Some(bytes) = Self::read_file(&path).await? else {
            log::debug!("No persisted document at {}", path.display());
            return Ok(None);
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn save(&self, namespace: &str, state: &PersistedState) -> Result<()> {
        let path = self.document_path(namespace);
        let bytes = serde_json::to_vec_pretty(state)?;
        Self::replace_file(&path, &bytes).await?;
        log::debug!(
            "Persisted {} favorites and {} recents to {}",
            state.favorites.len(),
            state.recent.len(),
            path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FavoriteEntry, RecentEntry, fixtures};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_replace_leaves_no_staging_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("doc.json");

        LocalStorage::replace_file(&path, b"first").await.unwrap();
        LocalStorage::replace_file(&path, b"second").await.unwrap();

        assert_eq!(
            LocalStorage::read_file(&path).await.unwrap(),
            Some(b"second".to_vec())
        );
        assert!(!tmp.path().join("nested").join("doc.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_load_missing_namespace() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        assert!(storage.load("stocks").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_state_survives_new_instance() {
        let tmp = TempDir::new().unwrap();
        let state = PersistedState {
            favorites: vec![FavoriteEntry {
                code: "005930".into(),
                name: "삼성전자".into(),
            }],
            recent: vec![RecentEntry::from(&fixtures::news("n1", "금리 동결"))],
        };

        LocalStorage::new(tmp.path())
            .save("news", &state)
            .await
            .unwrap();
        assert!(tmp.path().join("news.json").exists());

        let loaded = LocalStorage::new(tmp.path())
            .load("news")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded, state);
    }

    #[tokio::test]
    async fn test_corrupt_document_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        tokio::fs::write(tmp.path().join("stocks.json"), b"{not json")
            .await
            .unwrap();

        assert!(matches!(
            storage.load("stocks").await,
            Err(AppError::Json(_))
        ));
    }
}
