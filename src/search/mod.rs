//! Candidate URL sources
//!
//! The search provider turns a free-text query into a ranked list of candidate
//! pages. It sits behind a trait so the pipeline can be driven by any
//! provider, or by a caller-supplied URL list with no search at all.

mod custom_search;

pub use custom_search::{CustomSearchProvider, API_KEY_ENV, ENGINE_ID_ENV};

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Upper bound on one search API call, paging included per page
pub const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds the HTTP client used for search calls
pub fn build_search_client() -> Result<Client, reqwest::Error> {
    Client::builder().timeout(SEARCH_TIMEOUT).build()
}

/// A candidate page and its 1-based position in the search results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateUrl {
    pub url: String,
    pub rank: usize,
}

impl CandidateUrl {
    /// Ranks a plain URL list by position
    pub fn from_urls<I, S>(urls: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        urls.into_iter()
            .enumerate()
            .map(|(index, url)| Self {
                url: url.into(),
                rank: index + 1,
            })
            .collect()
    }
}

/// Errors raised by a search provider
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Missing search credential: {0}")]
    MissingCredential(&'static str),

    #[error("Search request failed: {0}")]
    Request(String),

    #[error("Search returned HTTP {0}")]
    Status(u16),

    #[error("Unreadable search response: {0}")]
    Decode(String),
}

impl SearchError {
    /// Only a missing credential fails the request; everything else degrades
    /// to an empty candidate list
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MissingCredential(_))
    }
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Returns up to `count` candidates for `query`, best first
    async fn search(&self, query: &str, count: usize) -> Result<Vec<CandidateUrl>, SearchError>;
}

/// Provider that answers every query with the same URL list
#[derive(Debug, Clone, Default)]
pub struct StaticSearchProvider {
    urls: Vec<String>,
}

impl StaticSearchProvider {
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl SearchProvider for StaticSearchProvider {
    async fn search(&self, _query: &str, count: usize) -> Result<Vec<CandidateUrl>, SearchError> {
        Ok(CandidateUrl::from_urls(self.urls.iter().take(count).cloned()))
    }
}
