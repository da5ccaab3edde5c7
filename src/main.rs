//! # grab-dl CLI
//!
//! Command-line interface for the grab-dl library.
//! Downloads a list of URLs one after the other into a directory.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use grab_dl::{
    fallback_name, BatchSummary, DownloadOptions, DownloadOutcome, Downloader, FetchConfig,
    DEFAULT_MAX_REDIRECTS,
};
use log::{error, LevelFilter};

mod cli;

/// Command-line interface for grab-dl
#[derive(Parser, Debug)]
#[command(name = "grab-dl")]
#[command(about = "Sequential HTTP/HTTPS downloader with redirect handling and collision-safe naming")]
#[command(long_about = "Downloads one or more files, one after the other:
  grab-dl https://example.com/a.pdf https://example.com/b.zip
  grab-dl                          # Read URLs from downloads.txt
  grab-dl -i mirrors.txt -o out/   # Custom list file and output directory

URL sources, in priority order:
  1. Command-line arguments
  2. The list file (one URL per line, # starts a comment)
  3. An interactive prompt (URLs separated by spaces or commas)

Existing files are never overwritten: report.pdf becomes report (1).pdf.")]
#[command(version = env!("GRAB_VERSION"))]
struct Cli {
    /// URLs to download
    urls: Vec<String>,

    /// File to read URLs from when none are given on the command line
    #[arg(short, long, default_value = "downloads.txt")]
    input_file: PathBuf,

    /// Directory to write downloaded files into
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Maximum number of redirects followed per URL
    #[arg(long, default_value_t = DEFAULT_MAX_REDIRECTS)]
    max_redirects: u32,

    /// Give up on connecting after this many seconds (transfers are never timed out)
    #[arg(long, value_name = "SECS")]
    connect_timeout: Option<u64>,

    /// Show what would be downloaded without downloading
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn fetch_config(&self) -> FetchConfig {
        let config = FetchConfig::default().with_max_redirects(self.max_redirects);
        match self.connect_timeout {
            Some(secs) => config.with_connect_timeout(Duration::from_secs(secs)),
            None => config,
        }
    }
}

#[tokio::main]
async fn main() {
    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("❌ Error: {e:#}");
            std::process::exit(1);
        }
    }
}

/// Initialize logging to stderr. `RUST_LOG` still wins when set.
fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::new();
    builder.target(env_logger::Target::Stderr);
    if verbose {
        builder
            .filter_level(LevelFilter::Info)
            .filter_module("grab_dl", LevelFilter::Debug);
    } else {
        builder.filter_level(LevelFilter::Error);
    }
    builder.parse_env("RUST_LOG");
    builder.init();
}

/// Returns whether every URL was downloaded
async fn run() -> anyhow::Result<bool> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.verbose {
        eprintln!("📦 grab-dl v{} starting...", env!("GRAB_VERSION"));
    }

    let (urls, source) = {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        cli::collect_urls(&cli.urls, &cli.input_file, &mut input)?
    };

    if urls.is_empty() {
        eprintln!("❌ No URLs to download");
        return Ok(false);
    }

    if cli.verbose {
        match &source {
            cli::UrlSource::Arguments => eprintln!("📋 {} URL(s) from arguments", urls.len()),
            cli::UrlSource::ListFile(path) => eprintln!("📋 {} URL(s) from {path}", urls.len()),
            cli::UrlSource::Prompt => eprintln!("📋 {} URL(s) from prompt", urls.len()),
        }
    }

    if cli.dry_run {
        for (i, url) in urls.iter().enumerate() {
            eprintln!(
                "🔍 [DRY RUN] Would download: {url} -> {}",
                cli.output_dir.join(fallback_name(url, i + 1)).display()
            );
        }
        return Ok(true);
    }

    let progress = cli::ProgressManager::new();
    let options = DownloadOptions {
        output_dir: cli.output_dir.clone(),
        progress: Some(progress.callback()),
        ..Default::default()
    };
    grab_dl::prepare_output_dir(&options).await?;

    let downloader = Downloader::with_config(cli.fetch_config(), options)?;

    let total = urls.len();
    let mut summary = BatchSummary::default();
    for (i, url) in urls.iter().enumerate() {
        eprintln!("\n[{}/{total}] 🌐 Downloading {url}", i + 1);
        let outcome = downloader.download(url, i + 1).await;
        report_failure(&outcome, &progress);
        summary.outcomes.push(outcome);
    }

    eprintln!(
        "\n📊 {}/{} successful",
        summary.succeeded(),
        summary.attempted()
    );

    Ok(summary.all_succeeded())
}

/// Prints the failure line and any guidance; success is reported by the progress manager
fn report_failure(outcome: &DownloadOutcome, progress: &cli::ProgressManager) {
    if let Err(ref e) = outcome.result {
        if progress.is_active() {
            progress.abandon();
        }
        eprintln!("❌ Failed: {e}");
        if let Some(hint) = e.hint() {
            eprintln!("💡 {hint}");
        }
    }
}
