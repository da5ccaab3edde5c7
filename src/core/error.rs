//! Error types for grab-dl library
//!
//! Every failure is scoped to a single URL. The batch runner turns these into
//! per-URL failure outcomes, so nothing here ever aborts the remaining queue.

use std::fmt;
use std::path::PathBuf;

/// Classification of a non-200 HTTP status for user-facing reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 403: the server refused us, usually bot protection
    AccessBlocked,
    /// 429: too many requests
    RateLimited,
    /// Anything else that is not 200
    Other,
}

impl StatusClass {
    /// Classify a raw HTTP status code
    pub fn from_status(status: u16) -> Self {
        match status {
            403 => StatusClass::AccessBlocked,
            429 => StatusClass::RateLimited,
            _ => StatusClass::Other,
        }
    }
}

/// Main error type for grab-dl operations
#[derive(Debug)]
pub enum Error {
    /// Input is not an absolute http(s) URL
    InvalidUrl(String),

    /// Redirect chain exceeded the configured cap
    TooManyRedirects { url: String, limit: u32 },

    /// Connection, DNS or TLS failure before a response was obtained
    NetworkError(String),

    /// Response received but status was not 200
    HttpStatus { url: String, status: u16 },

    /// Failure while reading the body or writing to disk after transfer began.
    /// The partially written file is left at `path`.
    StreamError {
        path: PathBuf,
        bytes_written: u64,
        message: String,
    },

    /// File I/O error outside of the transfer itself
    IoError(std::io::Error),

    /// Invalid configuration or parameters
    InvalidInput(String),
}

impl Error {
    /// Status classification for `HttpStatus` errors
    pub fn status_class(&self) -> Option<StatusClass> {
        match self {
            Error::HttpStatus { status, .. } => Some(StatusClass::from_status(*status)),
            _ => None,
        }
    }

    /// Extra guidance shown to the user for failures that have an obvious next step
    pub fn hint(&self) -> Option<&'static str> {
        match self.status_class()? {
            StatusClass::AccessBlocked => {
                Some("The site may block automated clients. Try opening the link in a browser.")
            }
            StatusClass::RateLimited => {
                Some("The server is throttling requests. Wait a while before running again.")
            }
            StatusClass::Other => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidUrl(msg) => {
                write!(f, "Invalid URL: {}", msg)
            }
            Error::TooManyRedirects { url, limit } => {
                write!(f, "Too many redirects (limit {}) while fetching {}", limit, url)
            }
            Error::NetworkError(msg) => {
                write!(f, "Network error: {}", msg)
            }
            Error::HttpStatus { url, status } => match StatusClass::from_status(*status) {
                StatusClass::AccessBlocked => write!(
                    f,
                    "HTTP {}: access blocked, possibly by bot protection ({})",
                    status, url
                ),
                StatusClass::RateLimited => {
                    write!(f, "HTTP {}: rate limited ({})", status, url)
                }
                StatusClass::Other => {
                    write!(f, "HTTP {}: download failed ({})", status, url)
                }
            },
            Error::StreamError {
                path,
                bytes_written,
                message,
            } => {
                write!(
                    f,
                    "Transfer interrupted after {} bytes: {} (partial file left at {})",
                    bytes_written,
                    message,
                    path.display()
                )
            }
            Error::IoError(err) => {
                write!(f, "I/O error: {}", err)
            }
            Error::InvalidInput(msg) => {
                write!(f, "Invalid input: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Strip the URL so messages stay short; callers already print it
        Error::NetworkError(err.without_url().to_string())
    }
}

/// Convenience result type for grab-dl operations
pub type Result<T> = std::result::Result<T, Error>;
