//! In-memory store for testing purposes.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use crate::error::{LoaderError, Result};
use crate::storage::DocumentStore;

/// A store that keeps documents in memory and can be told to reject some.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<Vec<(String, Vec<u8>)>>,
    rejected: Mutex<HashSet<String>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `store` call for `filename` fail with a storage error.
    pub fn reject(&self, filename: impl Into<String>) {
        lock(&self.rejected).insert(filename.into());
    }

    /// Filenames stored so far, in write order.
    pub fn filenames(&self) -> Vec<String> {
        lock(&self.documents)
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Last content stored under `filename`.
    pub fn get(&self, filename: &str) -> Option<Vec<u8>> {
        lock(&self.documents)
            .iter()
            .rev()
            .find(|(name, _)| name == filename)
            .map(|(_, bytes)| bytes.clone())
    }

    /// Number of writes
    pub fn len(&self) -> usize {
        lock(&self.documents).len()
    }

    /// Check if nothing was written
    pub fn is_empty(&self) -> bool {
        lock(&self.documents).is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn location(&self, filename: &str) -> String {
        format!("memory://{}", filename)
    }

    async fn store(&self, filename: &str, bytes: &[u8]) -> Result<String> {
        if lock(&self.rejected).contains(filename) {
            return Err(LoaderError::Storage(format!("{} rejected", filename)));
        }
        lock(&self.documents).push((filename.to_string(), bytes.to_vec()));
        Ok(self.location(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        let location = store.store("a.pdf", b"one").await.unwrap();
        assert_eq!(location, "memory://a.pdf");
        store.store("a.pdf", b"two").await.unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("a.pdf").unwrap(), b"two");
        assert_eq!(store.filenames(), vec!["a.pdf", "a.pdf"]);
    }

    #[tokio::test]
    async fn test_rejected_filename() {
        let store = MemoryStore::new();
        store.reject("bad.pdf");

        assert!(matches!(
            store.store("bad.pdf", b"x").await,
            Err(LoaderError::Storage(_))
        ));
        assert!(store.is_empty());
    }
}
