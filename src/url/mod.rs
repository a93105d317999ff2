//! Domain matching for candidate URLs
//!
//! Candidates whose host matches an exclusion pattern (video hosts, which never
//! embed recipe structured data) are dropped before any fetch is dispatched.

use crate::config::DomainEntry;
use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use recipe_consensus::url::extract_domain;
///
/// let url = Url::parse("https://WWW.Example.com/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("www.example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Checks if a domain matches a pattern
///
/// `"youtu.be"` matches only itself; `"*.youtube.com"` matches `youtube.com`
/// and any subdomain of it, at any depth.
///
/// # Examples
///
/// ```
/// use recipe_consensus::url::matches_wildcard;
///
/// assert!(matches_wildcard("*.youtube.com", "youtube.com"));
/// assert!(matches_wildcard("*.youtube.com", "m.youtube.com"));
/// assert!(!matches_wildcard("*.youtube.com", "notyoutube.com"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(base) => {
            candidate == base
                || candidate
                    .strip_suffix(base)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        }
        None => candidate == pattern,
    }
}

/// Returns true if the URL's host matches any exclusion pattern
///
/// Unparseable URLs are excluded as well; they could never be fetched.
pub fn is_excluded(url: &str, exclusions: &[DomainEntry]) -> bool {
    let Some(domain) = Url::parse(url).ok().as_ref().and_then(extract_domain) else {
        return true;
    };

    exclusions
        .iter()
        .any(|entry| matches_wildcard(&entry.domain.to_lowercase(), &domain))
}
