//! HTTP fetching with bounded redirect following
//!
//! Redirects are handled here rather than by reqwest so the hop count, the
//! relative `Location` resolution and the failure mode are all under our
//! control.

use log::debug;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::{Client, ClientBuilder, StatusCode};
use url::Url;

use crate::core::error::{Error, Result};
use crate::core::source::{parse_request_url, FetchConfig};
use crate::core::stream::ResponseStream;

/// Where a single URL's fetch currently stands
enum FetchState {
    /// About to send a GET for `url`, having already followed `hops` redirects
    Requesting { url: Url, hops: u32 },
    /// Got a 3xx with a usable Location
    Redirected { from: Url, to: Url, hops: u32 },
    /// Final response, handed to the caller as-is
    Delivered(ResponseStream),
    Failed(Error),
}

/// True for the status codes we follow
fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

/// Resolves a Location header value against the URL that produced it
pub fn resolve_location(base: &Url, location: &str) -> Option<Url> {
    let resolved = base.join(location.trim()).ok()?;
    matches!(resolved.scheme(), "http" | "https").then_some(resolved)
}

/// Issues GET requests with a browser-like header set and follows redirects
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    /// Create a new fetcher with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(FetchConfig::default())
    }

    /// Create a new fetcher with custom configuration
    pub fn with_config(config: FetchConfig) -> Result<Self> {
        let mut builder = ClientBuilder::new()
            .redirect(Policy::none())
            .user_agent(config.user_agent.clone());

        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| Error::InvalidInput(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetches `url`, following up to `max_redirects` redirect hops.
    ///
    /// Any final status is returned as a response, including 4xx/5xx; only
    /// network failures, invalid URLs and an exhausted redirect budget are errors.
    pub async fn fetch(&self, url: &str) -> Result<ResponseStream> {
        let url = parse_request_url(url)?;
        let mut state = FetchState::Requesting { url, hops: 0 };

        loop {
            state = match state {
                FetchState::Requesting { url, hops } => self.request(url, hops).await,
                FetchState::Redirected { from, to, hops } => {
                    debug!("Redirect {hops}: {from} -> {to}");
                    FetchState::Requesting { url: to, hops }
                }
                FetchState::Delivered(response) => return Ok(response),
                FetchState::Failed(err) => return Err(err),
            };
        }
    }

    /// Sends one GET and decides the next state from its status
    async fn request(&self, url: Url, hops: u32) -> FetchState {
        debug!("GET {url}");
        let response = match self
            .client
            .get(url.clone())
            .headers(self.config.request_headers(&url))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return FetchState::Failed(e.into()),
        };

        let status = response.status();
        if !is_redirect(status) {
            return FetchState::Delivered(ResponseStream::from_reqwest(response));
        }

        let target = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|location| resolve_location(&url, location));

        let Some(target) = target else {
            debug!("{status} from {url} without a usable Location, returning it as-is");
            return FetchState::Delivered(ResponseStream::from_reqwest(response));
        };

        // Close this hop's connection before doing anything else
        drop(response);

        if hops >= self.config.max_redirects {
            return FetchState::Failed(Error::TooManyRedirects {
                url: url.to_string(),
                limit: self.config.max_redirects,
            });
        }

        FetchState::Redirected {
            from: url,
            to: target,
            hops: hops + 1,
        }
    }
}
