//! Storage traits and error types
//!
//! This module defines the trait interface for link sinks and associated
//! error types.

use crate::crawler::ExtractedLink;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Append-only sink for extracted links
///
/// The crawler calls `append` once per submission body and once per
/// comment, including with empty batches. Implementations must not
/// deduplicate: appending the same link twice stores it twice.
pub trait LinkStore {
    /// Durably appends a batch of links, all or nothing
    fn append(&mut self, links: &[ExtractedLink]) -> StorageResult<()>;
}
