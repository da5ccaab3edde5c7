//! Download executor for grab-dl
//!
//! Takes a live response and writes it to a collision-free file in the output
//! directory, reporting progress per chunk.
//!
//! A transfer that fails midway leaves its partial file on disk. The error
//! carries the path so the caller can tell the user about it.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use futures::StreamExt;
use log::{error, info, warn};
use reqwest::StatusCode;
use tokio::fs::OpenOptions;
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::core::error::{Error, Result, StatusClass};
use crate::core::naming::{parse_content_disposition, resolve_unique_path, sanitize_filename};
use crate::core::progress::{format_transfer_summary, ProgressUpdate};
use crate::core::stream::{DownloadEvent, DownloadOptions, ResponseStream};

/// A file that was written completely
#[derive(Debug, Clone, PartialEq)]
pub struct SavedFile {
    pub path: PathBuf,
    pub bytes: u64,
    pub elapsed: Duration,
}

impl SavedFile {
    /// Human-readable size, time and throughput
    pub fn summary(&self) -> String {
        format_transfer_summary(self.bytes, self.elapsed)
    }
}

/// Writes responses to disk
pub struct DownloadExecutor {
    options: DownloadOptions,
}

impl Default for DownloadExecutor {
    fn default() -> Self {
        Self::new(DownloadOptions::default())
    }
}

impl DownloadExecutor {
    pub fn new(options: DownloadOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DownloadOptions {
        &self.options
    }

    /// Saves `response` to the output directory.
    ///
    /// Non-200 responses are rejected before touching the filesystem. The
    /// file name comes from Content-Disposition when present, else from
    /// `fallback_name`, and never replaces an existing file.
    pub async fn save(&self, response: ResponseStream, fallback_name: &str) -> Result<SavedFile> {
        let status = response.status();
        if status != StatusCode::OK {
            let url = response.url().to_string();
            drop(response);
            return Err(classify_status(url, status));
        }

        let name = self.choose_name(&response, fallback_name);
        let path = resolve_unique_path(&self.options.output_dir, &name);
        let total = response.content_length().filter(|&t| t > 0);

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        let mut writer = BufWriter::with_capacity(self.options.buffer_size, file);

        self.notify(&DownloadEvent::Started { path: &path, total });

        let started = Instant::now();
        let mut downloaded = 0u64;
        let mut chunks = response.into_chunks();

        while let Some(chunk) = chunks.next().await {
            let written = match chunk {
                Ok(bytes) => writer.write_all(&bytes).await.map(|()| bytes.len()),
                Err(e) => return Err(stream_failure(&path, downloaded, e.to_string(), writer).await),
            };

            match written {
                Ok(len) => downloaded += len as u64,
                Err(e) => return Err(stream_failure(&path, downloaded, e.to_string(), writer).await),
            }

            if let Some(total) = total {
                self.notify(&DownloadEvent::Progress(ProgressUpdate {
                    downloaded,
                    total,
                    elapsed: started.elapsed(),
                }));
            }
        }

        if let Err(e) = writer.flush().await {
            return Err(stream_failure(&path, downloaded, e.to_string(), writer).await);
        }
        drop(writer);

        let saved = SavedFile {
            path,
            bytes: downloaded,
            elapsed: started.elapsed(),
        };
        info!("Saved {}: {}", saved.path.display(), saved.summary());

        self.notify(&DownloadEvent::Finished {
            path: &saved.path,
            bytes: saved.bytes,
            elapsed: saved.elapsed,
        });

        Ok(saved)
    }

    /// Server-suggested name if usable, else the fallback
    fn choose_name(&self, response: &ResponseStream, fallback_name: &str) -> String {
        response
            .content_disposition()
            .and_then(parse_content_disposition)
            .map(|name| sanitize_filename(&name))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| match sanitize_filename(fallback_name) {
                name if name.is_empty() => "download.bin".to_string(),
                name => name,
            })
    }

    fn notify(&self, event: &DownloadEvent<'_>) {
        if let Some(ref progress) = self.options.progress {
            progress(event);
        }
    }
}

/// Logs a classified warning and builds the matching error
fn classify_status(url: String, status: StatusCode) -> Error {
    let code = status.as_u16();
    match StatusClass::from_status(code) {
        StatusClass::AccessBlocked => {
            warn!("{url}: HTTP {code}, access blocked (possibly bot protection)")
        }
        StatusClass::RateLimited => warn!("{url}: HTTP {code}, rate limited"),
        StatusClass::Other => warn!("{url}: HTTP {code}, download failed"),
    }
    Error::HttpStatus { url, status: code }
}

/// Closes the partial file and builds a stream error pointing at it
async fn stream_failure(
    path: &std::path::Path,
    bytes_written: u64,
    message: String,
    mut writer: BufWriter<tokio::fs::File>,
) -> Error {
    // Keep whatever made it into the buffer; the file is left as-is either way
    let _ = writer.flush().await;
    drop(writer);

    error!(
        "Transfer of {} failed after {bytes_written} bytes: {message}",
        path.display()
    );
    Error::StreamError {
        path: path.to_path_buf(),
        bytes_written,
        message,
    }
}
