use serde::Deserialize;

/// Browser User-Agent sent with every page fetch
///
/// Many recipe sites reject clients that do not look like a browser.
pub const DEFAULT_BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

/// Default Custom Search JSON API endpoint
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// Video hosts never carry recipe structured data
const DEFAULT_EXCLUDED_DOMAINS: &[&str] = &[
    "*.youtube.com",
    "youtu.be",
    "*.vimeo.com",
    "*.tiktok.com",
    "*.dailymotion.com",
];

/// Main configuration structure for Recipe-Consensus
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(rename = "fan-out")]
    pub fan_out: FanOutConfig,
    pub search: SearchConfig,
    #[serde(rename = "exclusion")]
    pub exclusions: Vec<DomainEntry>,
    pub normalizer: Option<ServiceConfig>,
    pub sorter: Option<ServiceConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: UserAgentConfig::default(),
            fan_out: FanOutConfig::default(),
            search: SearchConfig::default(),
            exclusions: DEFAULT_EXCLUDED_DOMAINS
                .iter()
                .map(|domain| DomainEntry {
                    domain: domain.to_string(),
                })
                .collect(),
            normalizer: None,
            sorter: None,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Full User-Agent header value
    pub browser: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            browser: DEFAULT_BROWSER_USER_AGENT.to_string(),
        }
    }
}

/// Fan-out sizing
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FanOutConfig {
    /// Number of recipes returned when the request does not name a limit
    #[serde(rename = "default-limit")]
    pub default_limit: usize,

    /// Number of search results requested as candidates
    #[serde(rename = "max-candidates")]
    pub max_candidates: usize,
}

impl Default for FanOutConfig {
    fn default() -> Self {
        Self {
            default_limit: 5,
            max_candidates: 10,
        }
    }
}

/// Search collaborator configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,

    /// Falls back to `RECIPE_SEARCH_API_KEY` when unset
    #[serde(rename = "api-key")]
    pub api_key: Option<String>,

    /// Falls back to `RECIPE_SEARCH_ENGINE_ID` when unset
    #[serde(rename = "engine-id")]
    pub engine_id: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            api_key: None,
            engine_id: None,
        }
    }
}

/// Endpoint of an optional external collaborator service
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub endpoint: String,
}

/// Domain pattern entry for the exclusion list
#[derive(Debug, Clone, Deserialize)]
pub struct DomainEntry {
    /// Domain pattern (e.g., "youtu.be" or "*.youtube.com")
    pub domain: String,
}
