//! Feed fetching and document download.
//!
//! A [`FeedFetcher`] requests one page of search results, walks its entries
//! in feed order and stores each entry's PDF in the configured
//! [`DocumentStore`]. Entries are processed one at a time.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{FetcherConfig, StorageTarget};
use crate::error::Result;
use crate::feed::parse_feed;
use crate::models::{DownloadResult, FeedEntry, FetchReport};
use crate::storage::{DocumentStore, LocalStore, S3Store};
use crate::utils::{sha256_hex, HttpClient};

/// Downloads every PDF referenced by one page of an arXiv search feed.
#[derive(Debug, Clone)]
pub struct FeedFetcher {
    config: FetcherConfig,
    url: String,
    client: HttpClient,
    store: Arc<dyn DocumentStore>,
}

impl FeedFetcher {
    /// Create a fetcher writing to the store selected by `config`.
    ///
    /// Nothing is sent over the network here.
    pub fn new(config: FetcherConfig) -> Result<Self> {
        let store: Arc<dyn DocumentStore> = match &config.storage {
            StorageTarget::Local { directory } => Arc::new(LocalStore::new(directory)),
            StorageTarget::Remote(settings) => Arc::new(S3Store::from_settings(settings)),
        };
        Self::with_store(config, store)
    }

    /// Create a fetcher writing to `store` instead of the configured target.
    pub fn with_store(config: FetcherConfig, store: Arc<dyn DocumentStore>) -> Result<Self> {
        let client = HttpClient::with_timeout(config.timeout)?;
        let url = config.request_url();

        Ok(Self {
            config,
            url,
            client,
            store,
        })
    }

    /// Request URL of the feed
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Validated configuration
    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Destination of downloaded documents
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Fetch the feed and store every entry's PDF.
    ///
    /// # Errors
    ///
    /// Fails without touching the store when the feed request fails or the
    /// body is not well-formed XML. Fails at the first entry without a PDF
    /// link; later entries are not processed. A network, storage or IO error
    /// while downloading or writing a single document is logged and recorded
    /// in the report instead.
    pub async fn fetch(&self) -> Result<FetchReport> {
        debug!("Requesting feed {}", self.url);
        let body = self.client.get_bytes(&self.url).await?;
        let feed = parse_feed(&body)?;

        info!(
            "Feed returned {} entries (total results: {})",
            feed.len(),
            feed.total_results
                .map(|n| n.to_string())
                .unwrap_or_else(|| "unknown".to_string())
        );

        let mut report = FetchReport::new(&self.url, feed.total_results);
        for entry in feed.into_entries() {
            let result = self.process(&entry).await?;
            report.results.push(result);
        }

        info!(
            "Stored {} of {} documents in {} ({} failed)",
            report.successful(),
            report.results.len(),
            self.store.name(),
            report.failed()
        );
        Ok(report)
    }

    /// Handle one entry. A missing link, an unusable store or any error that
    /// is not [recoverable](crate::error::LoaderError::is_recoverable) is fatal.
    async fn process(&self, entry: &FeedEntry) -> Result<DownloadResult> {
        let link = entry.require_pdf_link()?;
        let filename = entry.filename();
        debug!("Downloading {} as {}", link, filename);

        self.store.prepare().await?;

        let result = match self.download(link, &filename).await {
            Ok((location, bytes)) => DownloadResult::success(
                &entry.id,
                link,
                filename,
                location,
                bytes.len() as u64,
                sha256_hex(&bytes),
            ),
            Err(e) if e.is_recoverable() => {
                warn!(link = %link, error = %e, "Failed to download PDF");
                DownloadResult::error(&entry.id, link, filename, e.to_string())
            }
            Err(e) => return Err(e),
        };
        Ok(result.title(entry.title.clone()))
    }

    async fn download(&self, link: &str, filename: &str) -> Result<(String, Vec<u8>)> {
        let bytes = self.client.get_bytes(link).await?;
        let location = self.store.store(filename, &bytes).await?;
        Ok((location, bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoaderError;
    use crate::models::Query;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;

    /// Store failing every write with a configuration error
    #[derive(Debug)]
    struct MisconfiguredStore;

    #[async_trait]
    impl DocumentStore for MisconfiguredStore {
        fn name(&self) -> &str {
            "misconfigured"
        }

        fn location(&self, filename: &str) -> String {
            filename.to_string()
        }

        async fn store(&self, _filename: &str, _bytes: &[u8]) -> Result<String> {
            Err(LoaderError::config("no destination"))
        }
    }

    fn two_entry_feed(pdf_link: &str) -> String {
        format!(
            r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <id>http://arxiv.org/abs/0001</id>
    <title>First
      paper</title>
    <link title="pdf" href="{}"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/0002</id>
    <link title="pdf" href="{}"/>
  </entry>
</feed>"#,
            pdf_link, pdf_link
        )
    }

    #[test]
    fn test_url_is_built_at_construction() {
        let config = FetcherConfig::local(Query::new("electron").max_results(3), "/tmp/papers")
            .base_url("http://localhost:9/api/query");
        let fetcher = FeedFetcher::with_store(config, Arc::new(MemoryStore::new())).unwrap();
        assert_eq!(
            fetcher.url(),
            "http://localhost:9/api/query?search_query=all:electron&start=0&max_results=3"
        );
        assert_eq!(fetcher.store().name(), "memory");
    }

    #[test]
    fn test_new_selects_local_store() {
        let config = FetcherConfig::local(Query::default(), "/tmp/papers");
        let fetcher = FeedFetcher::new(config).unwrap();
        assert_eq!(fetcher.store().name(), "local");
        assert_eq!(
            fetcher.store().location("a.pdf"),
            std::path::Path::new("/tmp/papers").join("a.pdf").display().to_string()
        );
    }

    #[tokio::test]
    async fn test_unrecoverable_store_error_aborts_fetch() {
        let mut server = mockito::Server::new_async().await;
        let link = format!("{}/pdf/0001", server.url());
        let _feed = server
            .mock("GET", "/api/query")
            .match_query(mockito::Matcher::Any)
            .with_body(two_entry_feed(&link))
            .create_async()
            .await;
        let pdf = server
            .mock("GET", "/pdf/0001")
            .with_body("%PDF")
            .expect(1)
            .create_async()
            .await;

        let config = FetcherConfig::local(Query::default(), "/unused")
            .base_url(format!("{}/api/query", server.url()));
        let fetcher = FeedFetcher::with_store(config, Arc::new(MisconfiguredStore)).unwrap();

        assert!(matches!(fetcher.fetch().await, Err(LoaderError::Config(_))));
        // Second entry never downloaded
        pdf.assert_async().await;
    }

    #[tokio::test]
    async fn test_title_is_carried_into_results() {
        let mut server = mockito::Server::new_async().await;
        let link = format!("{}/pdf/0001", server.url());
        let _feed = server
            .mock("GET", "/api/query")
            .match_query(mockito::Matcher::Any)
            .with_body(two_entry_feed(&link))
            .create_async()
            .await;
        let _pdf = server
            .mock("GET", "/pdf/0001")
            .with_body("%PDF")
            .create_async()
            .await;

        let config = FetcherConfig::local(Query::default(), "/unused")
            .base_url(format!("{}/api/query", server.url()));
        let store = Arc::new(MemoryStore::new());
        let fetcher = FeedFetcher::with_store(config, store.clone()).unwrap();
        let report = fetcher.fetch().await.unwrap();

        assert_eq!(report.results[0].title.as_deref(), Some("First paper"));
        assert_eq!(report.results[1].title, None);
    }
}
