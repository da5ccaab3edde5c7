//! Response streams and download options for grab-dl
//!
//! `ResponseStream` is the hand-off point between the fetcher and the
//! executor: status, headers and a pull-based stream of body chunks.
//! Dropping it closes the underlying connection.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use reqwest::header::{HeaderMap, CONTENT_DISPOSITION, CONTENT_LENGTH};
use reqwest::StatusCode;
use url::Url;

use crate::core::error::{Error, Result};
use crate::core::progress::ProgressUpdate;

/// Body chunks as they arrive from the network
pub type ChunkStream = BoxStream<'static, Result<Bytes>>;

/// A live HTTP response owned by whoever is consuming it
pub struct ResponseStream {
    status: StatusCode,
    headers: HeaderMap,
    url: Url,
    body: ChunkStream,
}

impl ResponseStream {
    /// Assembles a response from its parts
    pub fn from_parts(status: StatusCode, headers: HeaderMap, url: Url, body: ChunkStream) -> Self {
        Self {
            status,
            headers,
            url,
            body,
        }
    }

    /// Wraps a reqwest response, mapping body errors into the crate error
    pub fn from_reqwest(response: reqwest::Response) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();
        let body = response.bytes_stream().map_err(Error::from).boxed();
        Self::from_parts(status, headers, url, body)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// URL the response was finally served from, after redirects
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Total size from Content-Length, if the server sent one
    pub fn content_length(&self) -> Option<u64> {
        self.headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
    }

    /// Raw Content-Disposition header, if present and valid UTF-8
    pub fn content_disposition(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
    }

    /// Consumes the response, yielding the body stream
    pub fn into_chunks(self) -> ChunkStream {
        self.body
    }
}

impl fmt::Debug for ResponseStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseStream")
            .field("status", &self.status)
            .field("url", &self.url.as_str())
            .field("content_length", &self.content_length())
            .finish_non_exhaustive()
    }
}

/// Lifecycle notifications for one download
#[derive(Debug)]
pub enum DownloadEvent<'a> {
    /// Destination chosen and opened; streaming is about to begin
    Started {
        path: &'a Path,
        total: Option<u64>,
    },
    /// A chunk was written. Only sent when the total size is known.
    Progress(ProgressUpdate),
    /// Stream ended and the file was flushed
    Finished {
        path: &'a Path,
        bytes: u64,
        elapsed: std::time::Duration,
    },
}

/// Progress callback function type
pub type ProgressCallback = Arc<dyn Fn(&DownloadEvent<'_>) + Send + Sync>;

/// Options for download operations
#[derive(Clone)]
pub struct DownloadOptions {
    /// Directory files are written to
    pub output_dir: PathBuf,

    /// Write buffer size for the destination file
    pub buffer_size: usize,

    /// Optional progress callback
    pub progress: Option<ProgressCallback>,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            buffer_size: 64 * 1024, // 64KB
            progress: None,
        }
    }
}

impl fmt::Debug for DownloadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadOptions")
            .field("output_dir", &self.output_dir)
            .field("buffer_size", &self.buffer_size)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}
