use crate::config::types::{Config, DomainEntry, FanOutConfig, SearchConfig, ServiceConfig};
use crate::ConfigError;
use url::Url;

const MAX_LIMIT: usize = 50;
const MAX_CANDIDATES: usize = 100;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_user_agent(&config.user_agent.browser)?;
    validate_fan_out(&config.fan_out)?;
    validate_search(&config.search)?;
    validate_exclusions(&config.exclusions)?;
    if let Some(normalizer) = &config.normalizer {
        validate_service("normalizer", normalizer)?;
    }
    if let Some(sorter) = &config.sorter {
        validate_service("sorter", sorter)?;
    }
    Ok(())
}

fn validate_user_agent(browser: &str) -> Result<(), ConfigError> {
    if browser.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent.browser cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_fan_out(config: &FanOutConfig) -> Result<(), ConfigError> {
    if config.default_limit < 1 || config.default_limit > MAX_LIMIT {
        return Err(ConfigError::Validation(format!(
            "default-limit must be between 1 and {}, got {}",
            MAX_LIMIT, config.default_limit
        )));
    }

    if config.max_candidates < 1 || config.max_candidates > MAX_CANDIDATES {
        return Err(ConfigError::Validation(format!(
            "max-candidates must be between 1 and {}, got {}",
            MAX_CANDIDATES, config.max_candidates
        )));
    }

    Ok(())
}

fn validate_search(config: &SearchConfig) -> Result<(), ConfigError> {
    validate_endpoint("search", &config.endpoint)?;

    // Credentials may come from the environment later; only reject blanks here
    for (name, value) in [("api-key", &config.api_key), ("engine-id", &config.engine_id)] {
        if matches!(value, Some(v) if v.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "search.{} cannot be empty when set",
                name
            )));
        }
    }

    Ok(())
}

fn validate_service(name: &str, config: &ServiceConfig) -> Result<(), ConfigError> {
    validate_endpoint(name, &config.endpoint)
}

fn validate_endpoint(name: &str, endpoint: &str) -> Result<(), ConfigError> {
    let url = Url::parse(endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} endpoint: {}", name, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} endpoint '{}' must use http or https",
            name, endpoint
        )));
    }

    Ok(())
}

fn validate_exclusions(domains: &[DomainEntry]) -> Result<(), ConfigError> {
    for entry in domains {
        validate_domain_pattern(&entry.domain)?;
    }
    Ok(())
}

/// Validates a domain pattern (supports a leading `*.` wildcard)
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain pattern cannot be empty".to_string(),
        ));
    }

    let domain = pattern.strip_prefix("*.").unwrap_or(pattern);

    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with(['.', '-']) || domain.ends_with(['.', '-']) || domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' is malformed",
            domain
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' must contain at least one dot (e.g., 'youtu.be')",
            domain
        )));
    }

    Ok(())
}
