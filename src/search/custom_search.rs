//! Custom Search JSON API provider

use crate::config::SearchConfig;
use crate::search::{CandidateUrl, SearchError, SearchProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// Environment fallback for `search.api-key`
pub const API_KEY_ENV: &str = "RECIPE_SEARCH_API_KEY";

/// Environment fallback for `search.engine-id`
pub const ENGINE_ID_ENV: &str = "RECIPE_SEARCH_ENGINE_ID";

/// The API serves at most 10 results per page
const PAGE_SIZE: usize = 10;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    link: String,
}

pub struct CustomSearchProvider {
    client: Client,
    endpoint: String,
    api_key: String,
    engine_id: String,
}

impl CustomSearchProvider {
    pub fn new(
        client: Client,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        engine_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            engine_id: engine_id.into(),
        }
    }

    /// Builds a provider from config, reading missing credentials from the
    /// environment
    ///
    /// # Returns
    ///
    /// * `Err(SearchError::MissingCredential)` - neither config nor environment
    ///   supplies the API key or engine id
    pub fn from_config(config: &SearchConfig, client: Client) -> Result<Self, SearchError> {
        let api_key = resolve(config.api_key.as_deref(), API_KEY_ENV)
            .ok_or(SearchError::MissingCredential("api-key"))?;
        let engine_id = resolve(config.engine_id.as_deref(), ENGINE_ID_ENV)
            .ok_or(SearchError::MissingCredential("engine-id"))?;

        Ok(Self::new(client, config.endpoint.as_str(), api_key, engine_id))
    }

    async fn fetch_page(
        &self,
        query: &str,
        start: usize,
        num: usize,
    ) -> Result<Vec<String>, SearchError> {
        let num = num.to_string();
        let start = start.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
                ("start", start.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SearchError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SearchError::Status(response.status().as_u16()));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Decode(e.to_string()))?;

        Ok(body.items.into_iter().map(|item| item.link).collect())
    }
}

#[async_trait]
impl SearchProvider for CustomSearchProvider {
    async fn search(&self, query: &str, count: usize) -> Result<Vec<CandidateUrl>, SearchError> {
        let mut links = Vec::new();

        while links.len() < count {
            let num = PAGE_SIZE.min(count - links.len());
            let page = self.fetch_page(query, links.len() + 1, num).await?;
            let exhausted = page.len() < num;
            links.extend(page);
            if exhausted {
                break;
            }
        }

        links.truncate(count);
        tracing::debug!("Search for {:?} returned {} candidates", query, links.len());
        Ok(CandidateUrl::from_urls(links))
    }
}

fn resolve(configured: Option<&str>, env_var: &str) -> Option<String> {
    configured
        .map(str::to_string)
        .or_else(|| std::env::var(env_var).ok())
        .filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> CustomSearchProvider {
        CustomSearchProvider::new(
            Client::new(),
            format!("{}/customsearch/v1", server.uri()),
            "key-123",
            "engine-456",
        )
    }

    #[tokio::test]
    async fn test_search_returns_ranked_links() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/customsearch/v1"))
            .and(query_param("key", "key-123"))
            .and(query_param("cx", "engine-456"))
            .and(query_param("q", "lu rou fan"))
            .and(query_param("num", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"link": "https://a.com/r", "title": "A"},
                    {"link": "https://b.com/r", "title": "B"},
                    {"link": "https://c.com/r", "title": "C"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let candidates = provider(&server).search("lu rou fan", 3).await.unwrap();
        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0].url, "https://a.com/r");
        assert_eq!(candidates[2].rank, 3);
    }

    #[tokio::test]
    async fn test_search_pages_past_ten() {
        let server = MockServer::start().await;
        let first: Vec<_> = (1..=10)
            .map(|i| json!({"link": format!("https://site{}.com/", i)}))
            .collect();
        Mock::given(method("GET"))
            .and(query_param("start", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": first })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("start", "11"))
            .and(query_param("num", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"link": "https://site11.com/"}]
            })))
            .mount(&server)
            .await;

        let candidates = provider(&server).search("stew", 12).await.unwrap();
        assert_eq!(candidates.len(), 11);
        assert_eq!(candidates[10].url, "https://site11.com/");
        assert_eq!(candidates[10].rank, 11);
    }

    #[tokio::test]
    async fn test_no_items_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"kind": "customsearch#search"})))
            .mount(&server)
            .await;

        assert!(provider(&server).search("zzz", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let error = provider(&server).search("soup", 5).await.unwrap_err();
        assert!(matches!(error, SearchError::Status(429)));
        assert!(!error.is_fatal());
    }

    #[test]
    fn test_configured_credentials_win() {
        let config = SearchConfig {
            api_key: Some("from-config".to_string()),
            engine_id: Some("engine".to_string()),
            ..SearchConfig::default()
        };
        let provider = CustomSearchProvider::from_config(&config, Client::new()).unwrap();
        assert_eq!(provider.api_key, "from-config");
        assert_eq!(provider.engine_id, "engine");
    }

    #[test]
    fn test_resolve_rejects_blank() {
        assert_eq!(resolve(Some("abc"), "UNUSED_RECIPE_TEST_VAR"), Some("abc".to_string()));
        assert_eq!(resolve(Some("   "), "UNUSED_RECIPE_TEST_VAR"), None);
        assert_eq!(resolve(None, "UNUSED_RECIPE_TEST_VAR"), None);
    }
}
