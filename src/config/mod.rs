//! Configuration module for Sublink
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use sublink::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sublink.toml")).unwrap();
//! println!("Requests spaced by {}ms", config.crawler.request_interval_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{AuthConfig, Config, CrawlerConfig, FilterConfig, OutputConfig, SourceConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
