//! AWS S3 store.
//!
//! Every document is uploaded with a single `PutObject` to
//! `s3://{bucket}/{prefix}/{filename}`.

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::info;

use crate::config::RemoteSettings;
use crate::error::{LoaderError, Result};
use crate::storage::DocumentStore;

/// Name reported by the static credentials provider
const CREDENTIALS_PROVIDER: &str = "arxiv-loader";

/// Uploads documents to an S3 bucket.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
    prefix: String,
}

impl S3Store {
    /// Create a new S3 store from an existing client.
    pub fn new(client: Client, bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }

    /// Build a client from explicit credentials. No request is sent.
    pub fn from_settings(settings: &RemoteSettings) -> Self {
        let credentials = Credentials::new(
            settings.access_key.clone(),
            settings.secret_key.clone(),
            None,
            None,
            CREDENTIALS_PROVIDER,
        );

        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .credentials_provider(credentials);

        if let Some(endpoint) = &settings.endpoint {
            // S3-compatible services usually don't do virtual-hosted buckets
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self::new(
            Client::from_conf(builder.build()),
            settings.bucket.clone(),
            settings.prefix.clone(),
        )
    }

    /// Bucket name
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Object key for `filename`: `<prefix>/<filename>`.
    pub fn key(&self, filename: &str) -> String {
        object_key(&self.prefix, filename)
    }
}

fn object_key(prefix: &str, filename: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        filename.to_string()
    } else {
        format!("{}/{}", prefix, filename)
    }
}

#[async_trait]
impl DocumentStore for S3Store {
    fn name(&self) -> &str {
        "s3"
    }

    fn location(&self, filename: &str) -> String {
        format!("s3://{}/{}", self.bucket, self.key(filename))
    }

    async fn store(&self, filename: &str, bytes: &[u8]) -> Result<String> {
        let key = self.key(filename);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(bytes.to_vec()))
            .content_type("application/pdf")
            .send()
            .await
            .map_err(|e| {
                LoaderError::Storage(format!(
                    "upload to s3://{}/{} failed: {}",
                    self.bucket,
                    key,
                    DisplayErrorContext(&e)
                ))
            })?;

        info!("Uploaded {} bytes to s3://{}/{}", bytes.len(), self.bucket, key);
        Ok(format!("s3://{}/{}", self.bucket, key))
    }
}
