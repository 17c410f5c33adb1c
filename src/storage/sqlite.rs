//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the LinkStore trait.

use crate::crawler::ExtractedLink;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{LinkStore, StorageResult};
use crate::storage::LinkRecord;
use rusqlite::{params, Connection};
use std::path::Path;

/// SQLite link log
pub struct SqliteLinkStore {
    conn: Connection,
}

impl SqliteLinkStore {
    /// Opens or creates the database at `path` and ensures the schema exists
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Counts all stored links
    pub fn count_links(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM links", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Returns up to `limit` most recently stored links, newest first
    pub fn recent_links(&self, limit: u32) -> StorageResult<Vec<LinkRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, url, submission_title, submission_date FROM links ORDER BY id DESC LIMIT ?1",
        )?;

        let links = stmt
            .query_map(params![limit], |row| {
                Ok(LinkRecord {
                    id: row.get(0)?,
                    url: row.get(1)?,
                    submission_title: row.get(2)?,
                    submission_date: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(links)
    }
}

impl LinkStore for SqliteLinkStore {
    fn append(&mut self, links: &[ExtractedLink]) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO links (url, submission_title, submission_date) VALUES (?1, ?2, ?3)",
            )?;
            for link in links {
                stmt.execute(params![link.url, link.submission_title, link.submission_date])?;
            }
        }
        tx.commit()?;

        tracing::trace!("Appended {} links", links.len());
        Ok(())
    }
}
