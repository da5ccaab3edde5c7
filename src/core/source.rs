//! Request configuration and URL handling for grab-dl
//!
//! Holds the fixed browser-like header set, the redirect cap, and the rules
//! for turning a URL into a fallback output name.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, REFERER};
use url::Url;

use crate::core::error::{Error, Result};
use crate::core::naming::sanitize_filename;

/// Maximum number of redirect hops followed for a single URL
pub const DEFAULT_MAX_REDIRECTS: u32 = 5;

/// Desktop browser User-Agent sent with every request
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Accept-Language sent with every request
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Configuration for the fetcher
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Redirect hops allowed before giving up
    pub max_redirects: u32,

    /// User-Agent header value
    pub user_agent: String,

    /// Accept-Language header value
    pub accept_language: String,

    /// Optional bound on connection setup. Transfers themselves are never timed out.
    pub connect_timeout: Option<Duration>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: BROWSER_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            connect_timeout: None,
        }
    }
}

impl FetchConfig {
    /// Override the redirect cap
    pub fn with_max_redirects(mut self, max_redirects: u32) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Bound connection setup time
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Per-request headers for `url`.
    ///
    /// User-Agent is set on the client itself. `Accept-Encoding: identity`
    /// keeps byte counts equal to on-disk size.
    pub fn request_headers(&self, url: &Url) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));
        if let Ok(language) = HeaderValue::from_str(&self.accept_language) {
            headers.insert(ACCEPT_LANGUAGE, language);
        }
        if let Ok(referer) = HeaderValue::from_str(&referer_for(url)) {
            headers.insert(REFERER, referer);
        }
        headers
    }
}

/// Referer value for a request: the URL's origin with a trailing slash
pub fn referer_for(url: &Url) -> String {
    format!("{}/", url.origin().ascii_serialization())
}

/// Parses and validates a request URL. Only absolute http/https URLs are accepted.
pub fn parse_request_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| Error::InvalidUrl(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::InvalidUrl(format!(
            "{raw}: unsupported scheme '{scheme}' (only http and https are supported)"
        ))),
    }
}

/// Generates a fallback output name from the URL's path basename.
///
/// `index` is the 1-based queue position, used for `file-<index>.bin` when the
/// URL has no usable basename.
pub fn fallback_name(url: &str, index: usize) -> String {
    let basename = Url::parse(url.trim())
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|last| !last.is_empty())
        .map(|last| {
            urlencoding::decode(&last)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| last.clone())
        })
        .map(|name| sanitize_filename(&name))
        .filter(|name| !name.is_empty());

    basename.unwrap_or_else(|| format!("file-{index}.bin"))
}
