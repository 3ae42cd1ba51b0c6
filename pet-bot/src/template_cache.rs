//! File text cache: each path is read from disk at most once per process.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::RwLock;
use tracing::debug;

/// Shared by all turns; entries are never evicted or reloaded.
#[derive(Debug, Default)]
pub struct TemplateCache {
    entries: RwLock<HashMap<PathBuf, Arc<str>>>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached text of `path`, reading the file on first use.
    /// A failed read is not cached.
    pub async fn get(&self, path: &Path) -> Result<Arc<str>> {
        if let Some(text) = self.entries.read().await.get(path) {
            return Ok(text.clone());
        }

        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read template {}", path.display()))?;
        debug!(path = %path.display(), len = text.len(), "Template loaded");

        // Two turns may race to the first read; the first insert wins.
        let mut entries = self.entries.write().await;
        let text = entries
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::from(text))
            .clone();
        Ok(text)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_reads_once_per_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("getPetById.json");
        fs::write(&path, r#"{"text": "${name}"}"#).unwrap();

        let cache = TemplateCache::new();
        let first = cache.get(&path).await.unwrap();
        fs::write(&path, "changed on disk").unwrap();
        let second = cache.get(&path).await.unwrap();

        assert_eq!(&*first, r#"{"text": "${name}"}"#);
        assert_eq!(first, second);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_missing_file_is_error_and_not_cached() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.json");
        let cache = TemplateCache::new();

        let err = cache.get(&path).await.unwrap_err();
        assert!(format!("{:#}", err).contains("absent.json"));
        assert!(cache.is_empty().await);

        fs::write(&path, "{}").unwrap();
        assert_eq!(&*cache.get(&path).await.unwrap(), "{}");
    }

    #[tokio::test]
    async fn test_concurrent_first_reads_agree() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("card.json");
        fs::write(&path, "{}").unwrap();
        let cache = Arc::new(TemplateCache::new());

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let path = path.clone();
                tokio::spawn(async move { cache.get(&path).await.unwrap() })
            })
            .collect();
        for task in tasks {
            assert_eq!(&*task.await.unwrap(), "{}");
        }
        assert_eq!(cache.len().await, 1);
    }
}
