//! arXiv Atom feed model and parsing.
//!
//! The search API answers with an Atom document that mixes three
//! namespaces:
//!
//! - [`ATOM_NS`] for `feed`, `entry`, `id`, `title` and `link`
//! - [`ARXIV_NS`] for arXiv-specific metadata (ignored here)
//! - [`OPENSEARCH_NS`] for the result counters
//!
//! Elements are matched on their resolved namespace, never on the prefix
//! used in the document.

mod atom;

use serde::{Deserialize, Serialize};

use crate::models::FeedEntry;

pub use atom::parse_feed;

/// Atom syndication namespace
pub const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
/// arXiv metadata namespace
pub const ARXIV_NS: &str = "http://arxiv.org/schemas/atom";
/// OpenSearch result-count namespace
pub const OPENSEARCH_NS: &str = "http://a9.com/-/spec/opensearch/1.1/";

/// One page of search results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    /// `opensearch:totalResults`
    pub total_results: Option<u64>,

    /// `opensearch:startIndex`
    pub start_index: Option<u64>,

    /// `opensearch:itemsPerPage`
    pub items_per_page: Option<u64>,

    /// Entries in document order
    pub entries: Vec<FeedEntry>,
}

impl Feed {
    /// Number of entries on this page
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the page has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the feed, yielding entries in document order.
    pub fn into_entries(self) -> std::vec::IntoIter<FeedEntry> {
        self.entries.into_iter()
    }
}
