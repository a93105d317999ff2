//! Request orchestration
//!
//! One aggregation request runs these stages in order:
//! candidates → fan-out collect → normalize → analyze → sort → report

use crate::config::Config;
use crate::crawler::Coordinator;
use crate::enrich::{
    apply_normalization, apply_sort, build_service_client, HttpNormalizer, HttpSorter,
    IngredientNormalizer, PassThroughNormalizer, PassThroughSorter, RecipeSorter,
};
use crate::output::{log_statistics, RecipeReport};
use crate::recipe::analyze;
use crate::search::{build_search_client, CandidateUrl, CustomSearchProvider, SearchProvider};
use crate::{ConsensusError, Result};
use reqwest::Client;
use std::sync::Arc;

/// Where the candidate URLs come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateSource {
    /// Free-text query handed to the search provider
    Query(String),
    /// Caller-supplied URLs, ranked by position
    Urls(Vec<String>),
}

/// One aggregation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationRequest {
    pub source: CandidateSource,
    /// Maximum number of recipes to accept
    pub limit: usize,
    /// Sort criterion forwarded to the sorter
    pub sort: Option<String>,
}

impl AggregationRequest {
    pub fn query(query: impl Into<String>, limit: usize) -> Self {
        Self {
            source: CandidateSource::Query(query.into()),
            limit,
            sort: None,
        }
    }

    pub fn urls<I, S>(urls: I, limit: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source: CandidateSource::Urls(urls.into_iter().map(Into::into).collect()),
            limit,
            sort: None,
        }
    }

    pub fn with_sort(mut self, criterion: impl Into<String>) -> Self {
        self.sort = Some(criterion.into());
        self
    }

    fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(ConsensusError::InvalidRequest(
                "limit must be at least 1".to_string(),
            ));
        }
        match &self.source {
            CandidateSource::Query(query) if query.trim().is_empty() => Err(
                ConsensusError::InvalidRequest("query cannot be empty".to_string()),
            ),
            _ => Ok(()),
        }
    }
}

/// Aggregation pipeline
///
/// Holds no per-request state; one pipeline can serve any number of
/// requests.
pub struct Pipeline {
    config: Config,
    coordinator: Coordinator,
    search_client: Client,
    search: Option<Arc<dyn SearchProvider>>,
    normalizer: Arc<dyn IngredientNormalizer>,
    sorter: Arc<dyn RecipeSorter>,
}

impl Pipeline {
    /// Builds a pipeline from configuration
    ///
    /// The search provider is resolved per query request, so a missing search
    /// credential only fails requests that actually need search.
    pub fn new(config: &Config) -> Result<Self> {
        let coordinator = Coordinator::new(config)?;
        let service_client = build_service_client()?;

        let normalizer: Arc<dyn IngredientNormalizer> = match &config.normalizer {
            Some(service) => Arc::new(HttpNormalizer::new(
                service_client.clone(),
                service.endpoint.as_str(),
            )),
            None => Arc::new(PassThroughNormalizer),
        };
        let sorter: Arc<dyn RecipeSorter> = match &config.sorter {
            Some(service) => Arc::new(HttpSorter::new(service_client, service.endpoint.as_str())),
            None => Arc::new(PassThroughSorter),
        };

        Ok(Self {
            config: config.clone(),
            coordinator,
            search_client: build_search_client()?,
            search: None,
            normalizer,
            sorter,
        })
    }

    /// Replaces the configured search provider
    pub fn with_search(mut self, provider: Arc<dyn SearchProvider>) -> Self {
        self.search = Some(provider);
        self
    }

    pub fn with_normalizer(mut self, normalizer: Arc<dyn IngredientNormalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_sorter(mut self, sorter: Arc<dyn RecipeSorter>) -> Self {
        self.sorter = sorter;
        self
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// Runs one aggregation request
    ///
    /// # Returns
    ///
    /// * `Ok(RecipeReport)` - possibly with an empty recipe set
    /// * `Err(ConsensusError)` - invalid request or missing search credentials
    pub async fn run(&self, request: &AggregationRequest) -> Result<RecipeReport> {
        request.validate()?;
        tracing::info!("Aggregating {:?} (limit {})", request.source, request.limit);

        let candidates = self.candidates(&request.source).await?;

        let (mut recipes, stats) = self
            .coordinator
            .collect_with_stats(&candidates, request.limit)
            .await;

        apply_normalization(&mut recipes, self.normalizer.as_ref()).await;
        analyze(&mut recipes);

        if let Some(criterion) = &request.sort {
            recipes = apply_sort(recipes, self.sorter.as_ref(), criterion).await;
        }

        log_statistics(&stats);

        let mut report = RecipeReport::new(recipes, stats);
        if let CandidateSource::Query(query) = &request.source {
            report.query = Some(query.clone());
        }
        report.sort = request.sort.clone();

        tracing::info!("Aggregated {} recipes", report.recipes.len());
        Ok(report)
    }

    /// Resolves the candidate list for a request
    ///
    /// Search failures other than missing credentials yield no candidates.
    pub async fn candidates(&self, source: &CandidateSource) -> Result<Vec<CandidateUrl>> {
        let query = match source {
            CandidateSource::Urls(urls) => return Ok(CandidateUrl::from_urls(urls.iter().cloned())),
            CandidateSource::Query(query) => query,
        };

        let provider = self.search_provider()?;
        match provider
            .search(query, self.config.fan_out.max_candidates)
            .await
        {
            Ok(candidates) => Ok(candidates),
            Err(e) if e.is_fatal() => Err(e.into()),
            Err(e) => {
                tracing::warn!("Search failed, continuing with no candidates: {}", e);
                Ok(Vec::new())
            }
        }
    }

    fn search_provider(&self) -> Result<Arc<dyn SearchProvider>> {
        if let Some(provider) = &self.search {
            return Ok(Arc::clone(provider));
        }
        let provider =
            CustomSearchProvider::from_config(&self.config.search, self.search_client.clone())?;
        Ok(Arc::new(provider))
    }
}
