//! HTTP fetcher implementation
//!
//! This module handles page retrieval for the fan-out, including:
//! - Building the HTTP client with a browser User-Agent
//! - A single GET per URL with a fixed timeout (no retries)
//! - Following redirects
//! - Classifying failures into a `FetchFailure`

use crate::config::UserAgentConfig;
use reqwest::{redirect::Policy, Client};
use std::borrow::Cow;
use std::time::Duration;
use thiserror::Error;

/// Per-fetch timeout; deliberately not configurable
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

const MAX_REDIRECTS: usize = 10;

/// A successfully fetched page
///
/// Lives only long enough to be handed to the extractor.
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// The URL that was requested
    pub url: String,
    /// Final URL after redirects
    pub final_url: String,
    pub status_code: u16,
    pub content: Vec<u8>,
}

impl RawDocument {
    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}

/// Why a fetch produced no document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchCause {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("redirect error: {0}")]
    Redirect(String),

    #[error("{0}")]
    Transport(String),
}

/// A failed fetch for one URL; the fan-out treats it as "no record"
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to fetch {url}: {cause}")]
pub struct FetchFailure {
    pub url: String,
    pub cause: FetchCause,
}

impl FetchFailure {
    fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        let cause = if error.is_timeout() {
            FetchCause::Timeout
        } else if error.is_redirect() {
            FetchCause::Redirect(error.to_string())
        } else if error.is_connect() {
            FetchCause::Connect(error.to_string())
        } else {
            FetchCause::Transport(error.to_string())
        };

        Self {
            url: url.to_string(),
            cause,
        }
    }
}

/// Builds the HTTP client shared by every fetch of a request
///
/// # Example
///
/// ```no_run
/// use recipe_consensus::config::UserAgentConfig;
/// use recipe_consensus::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.browser.as_str())
        .timeout(FETCH_TIMEOUT)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches one URL
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | `Ok(RawDocument)` |
/// | Non-2xx after redirects | `FetchCause::Status` |
/// | Timeout (request or body) | `FetchCause::Timeout` |
/// | Connection refused, DNS, TLS | `FetchCause::Connect` |
/// | Redirect loop or chain > 10 | `FetchCause::Redirect` |
///
/// Never retries.
pub async fn fetch_document(client: &Client, url: &str) -> Result<RawDocument, FetchFailure> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchFailure::from_reqwest(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchFailure {
            url: url.to_string(),
            cause: FetchCause::Status(status.as_u16()),
        });
    }

    let final_url = response.url().to_string();
    let content = response
        .bytes()
        .await
        .map_err(|e| FetchFailure::from_reqwest(url, e))?;

    Ok(RawDocument {
        url: url.to_string(),
        final_url,
        status_code: status.as_u16(),
        content: content.to_vec(),
    })
}
