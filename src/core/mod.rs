//! Core library modules for grab-dl
//!
//! This module contains the internal implementation details of the grab-dl library.

pub mod error;
pub mod source;
pub mod stream;
pub mod naming;
pub mod progress;
pub mod fetcher;
pub mod executor;
pub mod downloader;

// Re-export main types for internal use
pub use downloader::{BatchSummary, DownloadOutcome, Downloader};
pub use executor::{DownloadExecutor, SavedFile};
pub use fetcher::Fetcher;
pub use source::{fallback_name, FetchConfig};
