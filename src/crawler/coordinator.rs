//! Fan-out coordinator
//!
//! Drives fetch + extract across the candidate list:
//! - Drops candidates on excluded (video) domains before dispatch
//! - Starts every remaining fetch at once
//! - Joins the whole batch, then accepts records in rank order up to the limit
//!
//! Acceptance order depends only on rank, never on which fetch finished first.

use crate::config::{Config, DomainEntry};
use crate::crawler::extractor::extract_recipe;
use crate::crawler::fetcher::{build_http_client, fetch_document, FetchFailure};
use crate::crawler::task_group::TaskGroup;
use crate::output::RunStatistics;
use crate::recipe::{RecipeRecord, RecipeSet};
use crate::search::CandidateUrl;
use crate::url::is_excluded;
use crate::ConsensusError;
use reqwest::Client;

/// What one dispatched candidate produced
#[derive(Debug)]
pub enum PageOutcome {
    Extracted(RecipeRecord),
    /// Fetched fine, but no `Recipe` block on the page
    Absent,
    Failed(FetchFailure),
}

/// Fetches one page and extracts its recipe
///
/// Failures are folded into the outcome; nothing escapes this boundary.
pub async fn fetch_and_extract(client: &Client, url: &str) -> PageOutcome {
    match fetch_document(client, url).await {
        Ok(document) => match extract_recipe(&document.text()) {
            Some(recipe) => PageOutcome::Extracted(recipe),
            None => PageOutcome::Absent,
        },
        Err(failure) => PageOutcome::Failed(failure),
    }
}

/// Fan-out coordinator
pub struct Coordinator {
    client: Client,
    exclusions: Vec<DomainEntry>,
}

impl Coordinator {
    /// Creates a coordinator with its own HTTP client
    pub fn new(config: &Config) -> Result<Self, ConsensusError> {
        let client = build_http_client(&config.user_agent)?;
        Ok(Self::with_client(client, config.exclusions.clone()))
    }

    pub fn with_client(client: Client, exclusions: Vec<DomainEntry>) -> Self {
        Self { client, exclusions }
    }

    /// Splits candidates into (dispatched, excluded), each sorted by rank
    pub fn partition<'a>(
        &self,
        candidates: &'a [CandidateUrl],
    ) -> (Vec<&'a CandidateUrl>, Vec<&'a CandidateUrl>) {
        let mut ranked: Vec<&CandidateUrl> = candidates.iter().collect();
        ranked.sort_by_key(|candidate| candidate.rank);
        ranked
            .into_iter()
            .partition(|candidate| !is_excluded(&candidate.url, &self.exclusions))
    }

    /// Collects up to `limit` recipes, keyed `recipe_1..recipe_k` in rank order
    ///
    /// Returns an empty set, not an error, when nothing yields a recipe.
    pub async fn collect(&self, candidates: &[CandidateUrl], limit: usize) -> RecipeSet {
        self.collect_with_stats(candidates, limit).await.0
    }

    /// Same as `collect`, also reporting what happened to each candidate
    pub async fn collect_with_stats(
        &self,
        candidates: &[CandidateUrl],
        limit: usize,
    ) -> (RecipeSet, RunStatistics) {
        let mut stats = RunStatistics {
            candidates: candidates.len(),
            ..RunStatistics::default()
        };

        let (dispatched, excluded) = self.partition(candidates);
        stats.excluded = excluded.len();
        for candidate in &excluded {
            tracing::debug!("Excluded {} (rank {})", candidate.url, candidate.rank);
        }

        if limit == 0 {
            return (RecipeSet::new(), stats);
        }

        let mut group = TaskGroup::new();
        for candidate in &dispatched {
            let client = self.client.clone();
            let url = candidate.url.clone();
            group.spawn(async move { fetch_and_extract(&client, &url).await });
        }
        stats.dispatched = group.len();
        tracing::info!(
            "Dispatched {} fetches ({} excluded), limit {}",
            stats.dispatched,
            stats.excluded,
            limit
        );

        let outcomes = group.join_all().await;

        let mut recipes = RecipeSet::new();
        for (candidate, outcome) in dispatched.iter().zip(outcomes) {
            match outcome {
                Some(PageOutcome::Extracted(recipe)) => {
                    stats.extracted += 1;
                    if recipes.len() < limit {
                        let key = recipes.push(recipe);
                        tracing::debug!("Accepted {} as {}", candidate.url, key);
                    } else {
                        stats.discarded_over_limit += 1;
                        tracing::debug!("Discarded {}: limit reached", candidate.url);
                    }
                }
                Some(PageOutcome::Absent) => {
                    stats.extraction_absent += 1;
                    tracing::debug!("No recipe found at {}", candidate.url);
                }
                Some(PageOutcome::Failed(failure)) => {
                    stats.fetch_failures += 1;
                    tracing::warn!("{}", failure);
                }
                None => {
                    stats.fetch_failures += 1;
                }
            }
        }
        stats.accepted = recipes.len();

        (recipes, stats)
    }
}
