//! Core data models for queries, feed entries and download results.

mod entry;
mod query;
mod report;

pub use entry::{derive_filename, FeedEntry, PDF_EXTENSION};
pub use query::{Query, DEFAULT_MAX_RESULTS};
pub use report::{DownloadResult, FetchReport};
