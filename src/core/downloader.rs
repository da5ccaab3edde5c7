//! Core download functionality for grab-dl
//!
//! `Downloader` runs fetch then save for each URL, strictly one after the
//! other. Each URL's failure is captured in its own outcome and never stops
//! the rest of the queue.

use log::{debug, warn};

use crate::core::error::{Error, Result};
use crate::core::executor::{DownloadExecutor, SavedFile};
use crate::core::fetcher::Fetcher;
use crate::core::source::{fallback_name, FetchConfig};
use crate::core::stream::DownloadOptions;

/// Result of attempting one URL
#[derive(Debug)]
pub struct DownloadOutcome {
    /// URL as supplied by the caller
    pub url: String,
    pub result: Result<SavedFile>,
}

impl DownloadOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Aggregate of a whole run
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<DownloadOutcome>,
}

impl BatchSummary {
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.attempted() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }
}

/// High-level downloader combining the fetcher and the executor
pub struct Downloader {
    fetcher: Fetcher,
    executor: DownloadExecutor,
}

impl Downloader {
    /// Create a new downloader with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(FetchConfig::default(), DownloadOptions::default())
    }

    /// Create a new downloader with custom configuration
    pub fn with_config(config: FetchConfig, options: DownloadOptions) -> Result<Self> {
        Ok(Self {
            fetcher: Fetcher::with_config(config)?,
            executor: DownloadExecutor::new(options),
        })
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    pub fn executor(&self) -> &DownloadExecutor {
        &self.executor
    }

    /// Downloads one URL. `index` is its 1-based position, used for synthetic names.
    pub async fn download(&self, url: &str, index: usize) -> DownloadOutcome {
        let result = self.fetch_and_save(url, index).await;
        if let Err(ref e) = result {
            warn!("Failed {url}: {e}");
        }
        DownloadOutcome {
            url: url.to_string(),
            result,
        }
    }

    async fn fetch_and_save(&self, url: &str, index: usize) -> Result<SavedFile> {
        let response = self.fetcher.fetch(url).await?;
        debug!("{url}: {} from {}", response.status(), response.url());
        self.executor.save(response, &fallback_name(url, index)).await
    }

    /// Downloads every URL in order, calling `on_outcome` after each one.
    ///
    /// The next fetch does not start until the previous outcome is known.
    pub async fn download_all_with<I, S, F>(&self, urls: I, mut on_outcome: F) -> BatchSummary
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: FnMut(usize, &DownloadOutcome),
    {
        let mut summary = BatchSummary::default();
        for (i, url) in urls.into_iter().enumerate() {
            let outcome = self.download(url.as_ref(), i + 1).await;
            on_outcome(i + 1, &outcome);
            summary.outcomes.push(outcome);
        }
        summary
    }

    /// Downloads every URL in order
    pub async fn download_all<I, S>(&self, urls: I) -> BatchSummary
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.download_all_with(urls, |_, _| {}).await
    }
}

/// Ensures the output directory exists
pub async fn prepare_output_dir(options: &DownloadOptions) -> Result<()> {
    let dir = &options.output_dir;
    if dir.as_os_str().is_empty() {
        return Err(Error::InvalidInput("output directory must not be empty".to_string()));
    }
    tokio::fs::create_dir_all(dir).await?;
    Ok(())
}
