//! Per-entry download results and the report returned by a fetch.

use serde::{Deserialize, Serialize};

/// Outcome of downloading and storing one entry's document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadResult {
    /// Entry identifier
    pub id: String,

    /// Paper title from the feed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Link the document was read from
    pub pdf_link: String,

    /// Derived filename
    pub filename: String,

    /// Where the document was stored (path or `s3://` URL), empty on failure
    pub location: String,

    /// Number of bytes stored
    pub bytes: u64,

    /// Hex SHA-256 of the stored bytes
    pub sha256: Option<String>,

    /// Whether the document was stored
    pub success: bool,

    /// Error message if failed
    pub error: Option<String>,
}

impl DownloadResult {
    /// Create a successful download result
    pub fn success(
        id: impl Into<String>,
        pdf_link: impl Into<String>,
        filename: impl Into<String>,
        location: impl Into<String>,
        bytes: u64,
        sha256: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: None,
            pdf_link: pdf_link.into(),
            filename: filename.into(),
            location: location.into(),
            bytes,
            sha256: Some(sha256.into()),
            success: true,
            error: None,
        }
    }

    /// Create a failed download result
    pub fn error(
        id: impl Into<String>,
        pdf_link: impl Into<String>,
        filename: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: None,
            pdf_link: pdf_link.into(),
            filename: filename.into(),
            location: String::new(),
            bytes: 0,
            sha256: None,
            success: false,
            error: Some(error.into()),
        }
    }

    /// Attach the entry's title
    pub fn title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }
}

/// Everything one fetch did, in feed order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchReport {
    /// Request URL of the feed
    pub url: String,

    /// `opensearch:totalResults` reported by the feed
    pub total_results: Option<u64>,

    /// One result per processed entry
    pub results: Vec<DownloadResult>,
}

impl FetchReport {
    /// Create an empty report for `url`
    pub fn new(url: impl Into<String>, total_results: Option<u64>) -> Self {
        Self {
            url: url.into(),
            total_results,
            results: Vec::new(),
        }
    }

    /// Number of stored documents
    pub fn successful(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    /// Number of entries whose download or write failed
    pub fn failed(&self) -> usize {
        self.results.len() - self.successful()
    }

    /// Total bytes stored
    pub fn total_bytes(&self) -> u64 {
        self.results.iter().map(|r| r.bytes).sum()
    }

    /// Check if no entry was processed
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
