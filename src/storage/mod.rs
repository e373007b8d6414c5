//! Destinations for downloaded documents.
//!
//! The fetcher only talks to the [`DocumentStore`] trait. Two backends ship
//! with the crate plus an in-memory one for tests:
//!
//! - [`LocalStore`] writes `<directory>/<filename>`
//! - [`S3Store`] uploads to `<bucket>` under `<prefix>/<filename>`
//! - [`MemoryStore`] keeps everything in a `Vec`

mod local;
pub mod memory;
mod s3;

use async_trait::async_trait;

use crate::error::Result;

pub use local::LocalStore;
pub use memory::MemoryStore;
pub use s3::S3Store;

/// A destination for downloaded documents.
///
/// # Implementing a New Store
///
/// 1. Implement `name`, `location` and `store`
/// 2. Override `prepare` if the destination needs setting up before the
///    first byte is downloaded
#[async_trait]
pub trait DocumentStore: Send + Sync + std::fmt::Debug {
    /// Short backend name used in logs (e.g. "local", "s3")
    fn name(&self) -> &str;

    /// Where a document named `filename` ends up
    fn location(&self, filename: &str) -> String;

    /// Make the destination ready. Called before each download and must be
    /// idempotent.
    async fn prepare(&self) -> Result<()> {
        Ok(())
    }

    /// Persist `bytes` under `filename`, replacing any previous content.
    ///
    /// Returns the location written.
    async fn store(&self, filename: &str, bytes: &[u8]) -> Result<String>;
}
