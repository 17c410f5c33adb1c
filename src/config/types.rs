use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Sublink
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    pub filter: FilterConfig,
    pub output: OutputConfig,
}

/// Connection settings for the forum API
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the authenticated API
    #[serde(rename = "api-base", default = "default_api_base")]
    pub api_base: String,

    /// User agent sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Submissions requested per listing page
    #[serde(rename = "page-size", default = "default_page_size")]
    pub page_size: u32,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Credentials for the forum API
///
/// Either a pre-issued `access-token`, or a `client-id`/`client-secret` pair
/// exchanged once for an application-only token.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(rename = "access-token")]
    pub access_token: Option<String>,

    #[serde(rename = "client-id")]
    pub client_id: Option<String>,

    #[serde(rename = "client-secret")]
    pub client_secret: Option<String>,

    #[serde(rename = "token-url", default = "default_token_url")]
    pub token_url: String,
}

/// Crawl pacing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Minimum time between successive API requests (milliseconds)
    #[serde(rename = "request-interval-ms", default = "default_request_interval")]
    pub request_interval_ms: u64,

    /// Upper bound on "more comments" resolutions per submission
    #[serde(rename = "max-expansion-rounds", default = "default_max_expansion_rounds")]
    pub max_expansion_rounds: u32,
}

/// Link allow-list configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// Regular expressions searched for anywhere in a link
    #[serde(rename = "allowed-domains")]
    pub allowed_domains: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl CrawlerConfig {
    pub fn request_interval(&self) -> Duration {
        Duration::from_millis(self.request_interval_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            request_interval_ms: default_request_interval(),
            max_expansion_rounds: default_max_expansion_rounds(),
        }
    }
}

fn default_api_base() -> String {
    "https://oauth.reddit.com".to_string()
}

fn default_token_url() -> String {
    "https://www.reddit.com/api/v1/access_token".to_string()
}

fn default_page_size() -> u32 {
    100
}

fn default_request_timeout() -> u64 {
    30
}

// The API allows 100 queries per minute.
fn default_request_interval() -> u64 {
    700
}

fn default_max_expansion_rounds() -> u32 {
    crate::crawler::DEFAULT_MAX_EXPANSION_ROUNDS
}
