//! Configuration management.
//!
//! Raw [`LoaderOptions`] come from a TOML file and `ARXIV_LOADER_*`
//! environment variables (and, in the CLI, from flags). They are validated
//! once into an immutable [`FetcherConfig`].
//!
//! # Configuration File Format
//!
//! ```toml
//! query = "electron"
//! start = 0
//! max_results = 100
//! storage_kind = "local"
//! download_path = "papers"
//!
//! # remote storage
//! # storage_kind = "remote"
//! # bucket = "my-papers"
//! # region = "eu-west-1"
//! # prefix = "arxiv"
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{LoaderError, Result};
use crate::models::{Query, DEFAULT_MAX_RESULTS};

/// arXiv search endpoint
pub const DEFAULT_BASE_URL: &str = "http://export.arxiv.org/api/query";
/// Default local download directory
pub const DEFAULT_DOWNLOAD_PATH: &str = ".arxiv";
/// Default object key prefix
pub const DEFAULT_PREFIX: &str = "arxiv";
/// Default HTTP timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Prefix of environment overrides for any option
pub const ENV_PREFIX: &str = "ARXIV_LOADER";
/// Config file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "arxiv-loader.toml";

/// Fallback for `access_key`
pub const ACCESS_KEY_ENV: &str = "AWS_ACCESS_KEY_ID";
/// Fallback for `secret_key`
pub const SECRET_KEY_ENV: &str = "AWS_SECRET_ACCESS_KEY";
/// Fallback for `region`
pub const REGION_ENV: &str = "AWS_REGION";
/// Fallback for `bucket`
pub const BUCKET_ENV: &str = "AWS_BUCKET_NAME";

/// Which backend receives the documents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Local,
    #[default]
    Remote,
}

impl FromStr for StorageKind {
    type Err = LoaderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(StorageKind::Local),
            "remote" | "s3" => Ok(StorageKind::Remote),
            other => Err(LoaderError::config(format!(
                "storage_kind must be either 'local' or 'remote', got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Local => write!(f, "local"),
            StorageKind::Remote => write!(f, "remote"),
        }
    }
}

/// Unvalidated options, every field optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoaderOptions {
    #[serde(default)]
    pub query: Option<String>,

    #[serde(default)]
    pub start: Option<u64>,

    #[serde(default)]
    pub max_results: Option<u64>,

    /// `local` or `remote` (`s3` is accepted too)
    #[serde(default)]
    pub storage_kind: Option<String>,

    #[serde(default)]
    pub access_key: Option<String>,

    #[serde(default)]
    pub secret_key: Option<String>,

    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub bucket: Option<String>,

    #[serde(default)]
    pub prefix: Option<String>,

    /// S3-compatible endpoint override
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub download_path: Option<PathBuf>,

    /// Base for a relative `download_path` (default: working directory)
    #[serde(default)]
    pub root_dir: Option<PathBuf>,

    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl LoaderOptions {
    /// Overlay `other` on top of `self`; set fields of `other` win.
    pub fn merge(self, other: LoaderOptions) -> Self {
        Self {
            query: other.query.or(self.query),
            start: other.start.or(self.start),
            max_results: other.max_results.or(self.max_results),
            storage_kind: other.storage_kind.or(self.storage_kind),
            access_key: other.access_key.or(self.access_key),
            secret_key: other.secret_key.or(self.secret_key),
            region: other.region.or(self.region),
            bucket: other.bucket.or(self.bucket),
            prefix: other.prefix.or(self.prefix),
            endpoint: other.endpoint.or(self.endpoint),
            download_path: other.download_path.or(self.download_path),
            root_dir: other.root_dir.or(self.root_dir),
            base_url: other.base_url.or(self.base_url),
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
        }
    }
}

/// Connection details for the object store
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteSettings {
    pub bucket: String,
    pub prefix: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub endpoint: Option<String>,
}

impl fmt::Debug for RemoteSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteSettings")
            .field("bucket", &self.bucket)
            .field("prefix", &self.prefix)
            .field("region", &self.region)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// The single destination of a fetcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageTarget {
    /// Absolute directory on the local filesystem
    Local { directory: PathBuf },
    /// S3 bucket
    Remote(RemoteSettings),
}

impl StorageTarget {
    /// Kind of this target
    pub fn kind(&self) -> StorageKind {
        match self {
            StorageTarget::Local { .. } => StorageKind::Local,
            StorageTarget::Remote(_) => StorageKind::Remote,
        }
    }
}

/// Validated, immutable fetcher configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherConfig {
    pub query: Query,
    pub storage: StorageTarget,
    pub base_url: String,
    pub timeout: Duration,
}

impl FetcherConfig {
    /// Local storage config with every other option at its default.
    pub fn local(query: Query, directory: impl Into<PathBuf>) -> Self {
        Self {
            query,
            storage: StorageTarget::Local {
                directory: directory.into(),
            },
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Point the fetcher at another search endpoint
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Validate options, falling back to the process environment for remote
    /// credentials.
    pub fn from_options(options: LoaderOptions) -> Result<Self> {
        Self::from_options_with(options, |name| std::env::var(name).ok())
    }

    /// Validate options with `lookup` standing in for the environment.
    pub fn from_options_with<F>(options: LoaderOptions, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let kind = options
            .storage_kind
            .as_deref()
            .map(StorageKind::from_str)
            .transpose()?
            .unwrap_or_default();

        let max_results = options.max_results.unwrap_or(DEFAULT_MAX_RESULTS);
        if max_results == 0 {
            return Err(LoaderError::config("max_results must be greater than zero"));
        }

        let query = Query::new(options.query.unwrap_or_default())
            .start(options.start.unwrap_or(0))
            .max_results(max_results);

        let base_url = options
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        validate_base_url(&base_url)?;

        let storage = match kind {
            StorageKind::Local => StorageTarget::Local {
                directory: resolve_download_path(
                    options.download_path,
                    options.root_dir.as_deref(),
                )?,
            },
            StorageKind::Remote => {
                let pick = |value: Option<String>, env: &str| {
                    non_empty(value).or_else(|| non_empty(lookup(env)))
                };
                let access_key = pick(options.access_key, ACCESS_KEY_ENV);
                let secret_key = pick(options.secret_key, SECRET_KEY_ENV);
                let region = pick(options.region, REGION_ENV);
                let bucket = pick(options.bucket, BUCKET_ENV);

                match (access_key, secret_key, region, bucket) {
                    (Some(access_key), Some(secret_key), Some(region), Some(bucket)) => {
                        StorageTarget::Remote(RemoteSettings {
                            bucket,
                            prefix: options.prefix.unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
                            region,
                            access_key,
                            secret_key,
                            endpoint: non_empty(options.endpoint),
                        })
                    }
                    (access_key, secret_key, region, bucket) => {
                        let missing: Vec<&str> = [
                            ("access_key", access_key.is_none()),
                            ("secret_key", secret_key.is_none()),
                            ("region", region.is_none()),
                            ("bucket", bucket.is_none()),
                        ]
                        .iter()
                        .filter(|(_, absent)| *absent)
                        .map(|(name, _)| *name)
                        .collect();
                        return Err(LoaderError::config(format!(
                            "For remote storage, access_key, secret_key, region and bucket must be provided (missing: {})",
                            missing.join(", ")
                        )));
                    }
                }
            }
        };

        Ok(Self {
            query,
            storage,
            base_url,
            timeout: Duration::from_secs(options.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        })
    }

    /// Full request URL for the configured query
    pub fn request_url(&self) -> String {
        self.query.to_url(&self.base_url)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn validate_base_url(base_url: &str) -> Result<()> {
    let url = url::Url::parse(base_url)
        .map_err(|e| LoaderError::config(format!("Invalid base_url '{}': {}", base_url, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(LoaderError::config(format!(
            "base_url must use http or https, got '{}'",
            scheme
        ))),
    }
}

/// Absolute download directory for local storage.
fn resolve_download_path(download_path: Option<PathBuf>, root_dir: Option<&Path>) -> Result<PathBuf> {
    let path = download_path.unwrap_or_else(|| PathBuf::from(DEFAULT_DOWNLOAD_PATH));
    if path.as_os_str().is_empty() {
        return Err(LoaderError::config(
            "For local storage, download_path must be provided",
        ));
    }
    if path.is_absolute() {
        return Ok(path);
    }

    let joined = match root_dir {
        Some(root) => root.join(&path),
        None => path,
    };
    std::path::absolute(&joined).map_err(|e| {
        LoaderError::config(format!(
            "Cannot resolve download_path {}: {}",
            joined.display(),
            e
        ))
    })
}

/// Load options from an optional TOML file plus `ARXIV_LOADER_*` overrides.
pub fn load_options(path: Option<&Path>) -> Result<LoaderOptions> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }
    let settings = builder
        .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// `arxiv-loader.toml` in the working directory, if present
pub fn find_config_file() -> Option<PathBuf> {
    let candidate = PathBuf::from(CONFIG_FILE_NAME);
    candidate.is_file().then_some(candidate)
}
