use anyhow::{Context, Result};
use arxiv_loader::config::{
    find_config_file, load_options, ACCESS_KEY_ENV, BUCKET_ENV, CONFIG_FILE_NAME, REGION_ENV,
    SECRET_KEY_ENV,
};
use arxiv_loader::{FeedFetcher, FetchReport, FetcherConfig, LoaderOptions};
use clap::{Parser, Subcommand, ValueEnum};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// arXiv Loader - Download the PDFs of an arXiv search to disk or S3
#[derive(Parser, Debug)]
#[command(name = "arxiv-loader")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "hongkongkiwi")]
#[command(about = "Download the PDFs of an arXiv search to disk or S3", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv, -vvv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// Plain text format
    Plain,
}

/// Storage backends selectable from the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Storage {
    /// Local directory
    Local,
    /// S3 bucket
    #[value(alias = "s3")]
    Remote,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch one page of search results and store every PDF
    #[command(visible_alias = "f")]
    Fetch {
        /// Search keywords (empty matches everything)
        #[arg(long)]
        query: Option<String>,

        /// Offset of the first result
        #[arg(long)]
        start: Option<u64>,

        /// Number of results to request
        #[arg(long)]
        max_results: Option<u64>,

        /// Where to store documents
        #[arg(long, value_enum)]
        storage: Option<Storage>,

        /// Download directory for local storage
        #[arg(long)]
        download_path: Option<PathBuf>,

        /// Bucket for remote storage
        #[arg(long)]
        bucket: Option<String>,

        /// Object key prefix for remote storage
        #[arg(long)]
        prefix: Option<String>,

        /// Region of the bucket
        #[arg(long)]
        region: Option<String>,

        /// S3-compatible endpoint URL
        #[arg(long)]
        endpoint: Option<String>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Show all environment variables
    Env,
}

/// Print all recognized environment variables
fn print_env_vars() {
    println!("arXiv Loader - Environment Variables");
    println!();
    println!("Remote Storage:");
    println!("  {:<28}Access key for the bucket", ACCESS_KEY_ENV);
    println!("  {:<28}Secret key for the bucket", SECRET_KEY_ENV);
    println!("  {:<28}Region of the bucket", REGION_ENV);
    println!("  {:<28}Bucket name", BUCKET_ENV);
    println!();
    println!("Options (override {}):", CONFIG_FILE_NAME);
    println!("  ARXIV_LOADER_QUERY          Search keywords");
    println!("  ARXIV_LOADER_START          Offset of the first result (default: 0)");
    println!("  ARXIV_LOADER_MAX_RESULTS    Number of results (default: 1000)");
    println!("  ARXIV_LOADER_STORAGE_KIND   local or remote (default: remote)");
    println!("  ARXIV_LOADER_DOWNLOAD_PATH  Local download directory (default: .arxiv)");
    println!("  ARXIV_LOADER_ROOT_DIR       Base for a relative download path");
    println!("  ARXIV_LOADER_PREFIX         Object key prefix (default: arxiv)");
    println!("  ARXIV_LOADER_ENDPOINT       S3-compatible endpoint URL");
    println!("  ARXIV_LOADER_TIMEOUT_SECS   HTTP timeout in seconds (default: 30)");
    println!();
    println!("Other Settings:");
    println!("  RUST_LOG                    Rust logging level (e.g., debug, info, warn, error)");
    println!();
    println!("Example:");
    println!("  export ARXIV_LOADER_STORAGE_KIND=\"local\"");
    println!("  arxiv-loader fetch --query electron --max-results 10");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("arxiv_loader={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Env => {
            print_env_vars();
            Ok(())
        }
        Commands::Fetch {
            query,
            start,
            max_results,
            storage,
            download_path,
            bucket,
            prefix,
            region,
            endpoint,
            timeout,
        } => {
            let config_path = match cli.config {
                Some(path) => Some(path),
                None => find_config_file(),
            };
            if let Some(path) = &config_path {
                tracing::info!("Using config file: {}", path.display());
            }

            let overrides = LoaderOptions {
                query,
                start,
                max_results,
                storage_kind: storage.map(|s| match s {
                    Storage::Local => "local".to_string(),
                    Storage::Remote => "remote".to_string(),
                }),
                download_path,
                bucket,
                prefix,
                region,
                endpoint,
                timeout_secs: timeout,
                ..Default::default()
            };
            let options = load_options(config_path.as_deref())?.merge(overrides);

            let config = FetcherConfig::from_options(options)?;
            let fetcher = FeedFetcher::new(config)?;
            let report = fetcher
                .fetch()
                .await
                .with_context(|| format!("Fetching {} failed", fetcher.url()))?;

            output_report(&report, cli.output)?;
            if !cli.quiet {
                print_summary(&report);
            }
            Ok(())
        }
    }
}

/// Concrete format for `format`; `Auto` is a table on a terminal, JSON otherwise
fn resolve_format(format: OutputFormat, is_terminal: bool) -> OutputFormat {
    match format {
        OutputFormat::Auto if is_terminal => OutputFormat::Table,
        OutputFormat::Auto => OutputFormat::Json,
        other => other,
    }
}

/// Shorten `text` to `max` characters, ending in "..." when cut
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

fn report_table(report: &FetchReport) -> comfy_table::Table {
    use comfy_table::{Attribute, Cell, Color, Table};
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["ID", "Title", "Status", "Location", "Bytes"]);

    for result in &report.results {
        let status = if result.success {
            Cell::new("stored").fg(Color::Green)
        } else {
            Cell::new("failed").fg(Color::Red)
        };
        let location = if result.success {
            result.location.clone()
        } else {
            result.error.clone().unwrap_or_default()
        };

        table.add_row(vec![
            Cell::new(&result.id).add_attribute(Attribute::Bold),
            Cell::new(truncate(result.title.as_deref().unwrap_or_default(), 50)),
            status,
            Cell::new(location),
            Cell::new(result.bytes),
        ]);
    }
    table
}

fn output_report(report: &FetchReport, format: OutputFormat) -> Result<()> {
    match resolve_format(format, std::io::stdout().is_terminal()) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Plain => {
            for result in &report.results {
                if let Some(title) = &result.title {
                    println!("{}", title);
                }
                if result.success {
                    println!("  {} -> {}", result.id, result.location);
                } else {
                    println!(
                        "  {} FAILED: {}",
                        result.id,
                        result.error.as_deref().unwrap_or_default()
                    );
                }
            }
        }
        OutputFormat::Table => {
            println!("{}", report_table(report));
        }
        OutputFormat::Auto => unreachable!(),
    }
    Ok(())
}

/// One-line summary on stderr so JSON output stays parseable
fn print_summary(report: &FetchReport) {
    let failed = report.failed();
    let failed = if failed > 0 {
        failed.to_string().red().bold().to_string()
    } else {
        failed.to_string()
    };
    eprintln!(
        "{} stored, {} failed, {} bytes ({} total results)",
        report.successful().to_string().green().bold(),
        failed,
        report.total_bytes(),
        report
            .total_results
            .map(|n| n.to_string())
            .unwrap_or_else(|| "?".to_string())
    );
}
