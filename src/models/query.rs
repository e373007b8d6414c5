//! Search query model and request URL construction.

use serde::{Deserialize, Serialize};

/// Default number of results requested per page
pub const DEFAULT_MAX_RESULTS: u64 = 1000;

/// Search query parameters for one page of results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Search keywords (empty matches everything)
    pub keywords: String,

    /// Offset of the first result
    pub start: u64,

    /// Page size, always greater than zero once validated
    pub max_results: u64,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            keywords: String::new(),
            start: 0,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl Query {
    /// Create a new query
    pub fn new(keywords: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            ..Default::default()
        }
    }

    /// Set the result offset
    pub fn start(mut self, start: u64) -> Self {
        self.start = start;
        self
    }

    /// Set the page size
    pub fn max_results(mut self, max: u64) -> Self {
        self.max_results = max;
        self
    }

    /// The `search_query` parameter: `all` or `all:<keywords>`.
    pub fn search_query(&self) -> String {
        let keywords = self.keywords.trim();
        if keywords.is_empty() {
            "all".to_string()
        } else {
            format!("all:{}", urlencoding::encode(keywords))
        }
    }

    /// Full request URL against `base_url`.
    pub fn to_url(&self, base_url: &str) -> String {
        format!(
            "{}?search_query={}&start={}&max_results={}",
            base_url,
            self.search_query(),
            self.start,
            self.max_results
        )
    }
}
