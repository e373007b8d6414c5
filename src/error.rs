//! Error types for feed fetching and document storage.

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Errors that can occur while loading papers from a feed.
///
/// `Config`, `Network` on the feed request, `Parse` and `MissingLink` abort a
/// whole [`fetch`](crate::fetcher::FeedFetcher::fetch). `Network`, `Storage`
/// and `Io` raised while downloading or storing a single document are
/// recorded on that entry's [`DownloadResult`](crate::models::DownloadResult)
/// instead.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// The feed body is not well-formed XML
    #[error("Parse error: {0}")]
    Parse(String),

    /// An entry has no `link` with `title="pdf"`
    #[error("PDF link not found for arXiv ID: {id}")]
    MissingLink {
        /// Identifier of the offending entry (may be empty)
        id: String,
    },

    /// Object storage rejected an upload
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error (file system)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoaderError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Whether a per-entry download may recover from this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Storage(_) | Self::Io(_))
    }
}

impl From<reqwest::Error> for LoaderError {
    fn from(err: reqwest::Error) -> Self {
        LoaderError::Network(err.to_string())
    }
}

impl From<quick_xml::Error> for LoaderError {
    fn from(err: quick_xml::Error) -> Self {
        LoaderError::Parse(format!("XML: {}", err))
    }
}

impl From<quick_xml::events::attributes::AttrError> for LoaderError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        LoaderError::Parse(format!("XML attribute: {}", err))
    }
}

impl From<config::ConfigError> for LoaderError {
    fn from(err: config::ConfigError) -> Self {
        LoaderError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_link_message_names_entry() {
        let err = LoaderError::MissingLink {
            id: "http://arxiv.org/abs/2301.12345v1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "PDF link not found for arXiv ID: http://arxiv.org/abs/2301.12345v1"
        );
    }

    #[test]
    fn test_recoverable_variants() {
        assert!(LoaderError::Network("reset".into()).is_recoverable());
        assert!(LoaderError::Storage("denied".into()).is_recoverable());
        assert!(!LoaderError::parse("bad").is_recoverable());
        assert!(!LoaderError::config("bad").is_recoverable());
        assert!(!LoaderError::MissingLink { id: String::new() }.is_recoverable());
    }
}
