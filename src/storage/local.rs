//! Local filesystem store.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::Result;
use crate::storage::DocumentStore;

/// Writes documents into a single directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    directory: PathBuf,
}

impl LocalStore {
    /// Create a store rooted at `directory`. Nothing is created until
    /// [`DocumentStore::prepare`] runs.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    fn path_for(&self, filename: &str) -> PathBuf {
        self.directory.join(filename)
    }
}

#[async_trait]
impl DocumentStore for LocalStore {
    fn name(&self) -> &str {
        "local"
    }

    fn location(&self, filename: &str) -> String {
        self.path_for(filename).display().to_string()
    }

    async fn prepare(&self) -> Result<()> {
        if !tokio::fs::try_exists(&self.directory).await? {
            tracing::debug!("Creating download directory {}", self.directory.display());
        }
        tokio::fs::create_dir_all(&self.directory).await?;
        Ok(())
    }

    async fn store(&self, filename: &str, bytes: &[u8]) -> Result<String> {
        let path = self.path_for(filename);
        // Truncates any existing file
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_prepare_creates_nested_directory() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("a").join("b");
        let store = LocalStore::new(&target);

        store.prepare().await.unwrap();
        assert!(target.is_dir());

        // Idempotent
        store.prepare().await.unwrap();
    }

    #[tokio::test]
    async fn test_store_truncates_existing_file() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        store.prepare().await.unwrap();

        store.store("paper.pdf", b"first version, longer").await.unwrap();
        let location = store.store("paper.pdf", b"second").await.unwrap();

        assert_eq!(location, dir.path().join("paper.pdf").display().to_string());
        assert_eq!(std::fs::read(dir.path().join("paper.pdf")).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_store_without_directory_fails() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("missing"));
        assert!(store.store("paper.pdf", b"data").await.is_err());
    }
}
