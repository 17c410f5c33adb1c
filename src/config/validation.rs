use crate::config::types::{AuthConfig, Config, CrawlerConfig, FilterConfig, OutputConfig, SourceConfig};
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_source_config(&config.source)?;
    validate_auth_config(&config.auth)?;
    validate_crawler_config(&config.crawler)?;
    validate_filter_config(&config.filter)?;
    validate_output_config(&config.output)?;
    Ok(())
}

fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.api_base)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid api-base: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "api-base '{}' must use http or https",
            config.api_base
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.page_size < 1 || config.page_size > 100 {
        return Err(ConfigError::Validation(format!(
            "page-size must be between 1 and 100, got {}",
            config.page_size
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_auth_config(config: &AuthConfig) -> Result<(), ConfigError> {
    let has_token = config
        .access_token
        .as_deref()
        .is_some_and(|t| !t.trim().is_empty());
    let has_client = config.client_id.as_deref().is_some_and(|c| !c.is_empty())
        && config.client_secret.as_deref().is_some_and(|s| !s.is_empty());

    if !has_token && !has_client {
        return Err(ConfigError::Validation(
            "auth requires either access-token or both client-id and client-secret".to_string(),
        ));
    }

    if has_client && !has_token {
        Url::parse(&config.token_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid token-url: {}", e)))?;
    }

    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_expansion_rounds < 1 {
        return Err(ConfigError::Validation(format!(
            "max-expansion-rounds must be >= 1, got {}",
            config.max_expansion_rounds
        )));
    }

    Ok(())
}

fn validate_filter_config(config: &FilterConfig) -> Result<(), ConfigError> {
    if config.allowed_domains.is_empty() {
        return Err(ConfigError::Validation(
            "allowed-domains must contain at least one pattern".to_string(),
        ));
    }

    for pattern in &config.allowed_domains {
        validate_domain_pattern(pattern)?;
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates a single allow-list pattern
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain pattern cannot be empty".to_string(),
        ));
    }

    Regex::new(pattern)
        .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))?;

    Ok(())
}
