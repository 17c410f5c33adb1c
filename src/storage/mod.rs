//! Storage module for persisting extracted links
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization
//! - Append-only link persistence with provenance
//! - Read helpers for operator statistics

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteLinkStore;
pub use traits::{LinkStore, StorageError, StorageResult};

use std::path::Path;

/// Opens (creating if needed) the link database at `path`
pub fn open_store(path: &Path) -> StorageResult<SqliteLinkStore> {
    SqliteLinkStore::new(path)
}

/// A stored link row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    pub id: i64,
    pub url: String,
    pub submission_title: Option<String>,
    pub submission_date: Option<String>,
}
