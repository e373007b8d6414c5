//! # arXiv Loader
//!
//! Fetches one page of the arXiv search feed and stores the PDF of every
//! entry on the local filesystem or in an S3 bucket.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`]: Option loading and validation into a [`FetcherConfig`]
//! - [`models`]: Core data structures (Query, FeedEntry, FetchReport)
//! - [`feed`]: Namespace-aware Atom feed parsing
//! - [`storage`]: Document stores behind the [`DocumentStore`] trait
//! - [`fetcher`]: The [`FeedFetcher`] tying it all together
//! - [`utils`]: HTTP client and digests
//!
//! ## Example
//!
//! ```rust,no_run
//! use arxiv_loader::{FeedFetcher, FetcherConfig, Query};
//!
//! # #[tokio::main]
//! # async fn main() -> arxiv_loader::Result<()> {
//! let config = FetcherConfig::local(Query::new("electron").max_results(10), "/tmp/papers");
//! let report = FeedFetcher::new(config)?.fetch().await?;
//! println!("{} stored, {} failed", report.successful(), report.failed());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod feed;
pub mod fetcher;
pub mod models;
pub mod storage;
pub mod utils;

// Re-export commonly used types
pub use config::{FetcherConfig, LoaderOptions, StorageKind, StorageTarget};
pub use error::{LoaderError, Result};
pub use fetcher::FeedFetcher;
pub use models::{DownloadResult, FeedEntry, FetchReport, Query};
pub use storage::DocumentStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
