//! # grab-dl
//!
//! Sequential HTTP/HTTPS downloader. Follows redirects up to a fixed depth,
//! streams bodies to disk with progress reporting, and never overwrites an
//! existing file.
//!
//! ## Quick start
//!
//! ```no_run
//! # async fn example() -> grab_dl::Result<()> {
//! // Download one URL into the current directory
//! let saved = grab_dl::get("https://example.com/report.pdf").await?;
//! println!("{} ({})", saved.path.display(), saved.summary());
//!
//! // Download several, one after the other
//! let summary = grab_dl::get_all(&["https://example.com/a.zip", "https://example.com/b.zip"]).await?;
//! println!("{}/{} successful", summary.succeeded(), summary.attempted());
//! # Ok(())
//! # }
//! ```
//!
//! ## Lower-level use
//!
//! [`Fetcher`] and [`DownloadExecutor`] can be driven separately: fetch a
//! [`ResponseStream`], inspect it, then hand it to the executor.

mod core;

pub use crate::core::downloader::prepare_output_dir;
pub use crate::core::error::{Error, Result, StatusClass};
pub use crate::core::naming::{parse_content_disposition, resolve_unique_path, sanitize_filename};
pub use crate::core::progress::{
    format_progress_line, format_transfer_summary, render_bar, Eta, ProgressUpdate, BAR_WIDTH,
};
pub use crate::core::source::{
    parse_request_url, BROWSER_USER_AGENT, DEFAULT_ACCEPT_LANGUAGE, DEFAULT_MAX_REDIRECTS,
};
pub use crate::core::stream::{
    ChunkStream, DownloadEvent, DownloadOptions, ProgressCallback, ResponseStream,
};
pub use crate::core::{
    fallback_name, BatchSummary, DownloadExecutor, DownloadOutcome, Downloader, FetchConfig,
    Fetcher, SavedFile,
};

/// Download a single URL into the current directory with default options
pub async fn get(url: &str) -> Result<SavedFile> {
    get_with_options(url, FetchConfig::default(), DownloadOptions::default()).await
}

/// Download a single URL with custom configuration
pub async fn get_with_options(
    url: &str,
    config: FetchConfig,
    options: DownloadOptions,
) -> Result<SavedFile> {
    prepare_output_dir(&options).await?;
    let downloader = Downloader::with_config(config, options)?;
    downloader.download(url, 1).await.result
}

/// Download every URL in order into the current directory
pub async fn get_all<I, S>(urls: I) -> Result<BatchSummary>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let downloader = Downloader::new()?;
    Ok(downloader.download_all(urls).await)
}
