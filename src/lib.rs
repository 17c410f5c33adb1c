//! Sublink: an allow-listed link harvester for forum discussions
//!
//! This crate walks a forum source's submissions newest-first, fully expands
//! each submission's comment tree, keeps the hyperlinks that match a
//! configured domain allow-list, and appends them with provenance to a
//! SQLite link log.

pub mod config;
pub mod crawler;
pub mod filter;
pub mod source;
pub mod state;
pub mod storage;
pub mod trigger;

use serde::Serialize;
use thiserror::Error;

/// Main error type for Sublink operations
#[derive(Debug, Error)]
pub enum SublinkError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Source error: {0}")]
    Source(#[from] source::SourceError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlState,
        to: state::CrawlState,
    },
}

/// Machine-readable failure category reported to trigger callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureReason {
    InvalidRequest,
    SourceUnavailable,
    InternalFailure,
}

impl SublinkError {
    /// Classifies this error for the trigger response
    ///
    /// Transient fetch failures and persistence failures are not retried and
    /// surface as `InternalFailure`.
    pub fn reason(&self) -> FailureReason {
        match self {
            Self::InvalidRequest(_) => FailureReason::InvalidRequest,
            Self::Source(source::SourceError::Unavailable { .. }) => {
                FailureReason::SourceUnavailable
            }
            _ => FailureReason::InternalFailure,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// Result type alias for Sublink operations
pub type Result<T> = std::result::Result<T, SublinkError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlOrchestrator, CrawlRequest, CrawlResult, ExtractedLink, TextUnit};
pub use filter::DomainPatternSet;
pub use state::CrawlState;
pub use trigger::{trigger, TriggerResponse};
