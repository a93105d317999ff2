//! Configuration module for Recipe-Consensus
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section has defaults, so a missing file means `Config::default()`.
//!
//! # Example
//!
//! ```no_run
//! use recipe_consensus::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("recipes.toml")).unwrap();
//! println!("Default limit: {}", config.fan_out.default_limit);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, DomainEntry, FanOutConfig, SearchConfig, ServiceConfig, UserAgentConfig,
    DEFAULT_BROWSER_USER_AGENT, DEFAULT_SEARCH_ENDPOINT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
