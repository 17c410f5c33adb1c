//! Forum source abstraction
//!
//! This module defines the seam between the crawl pipeline and the external
//! discussion API:
//! - the submission and comment data model
//! - the `ForumSource` trait the crawler drives
//! - credential providers for authenticated sessions
//! - the Reddit implementation over its OAuth JSON API

mod credentials;
mod listing;
mod reddit;

pub use credentials::{
    provider_from_config, AccessToken, ClientCredentials, CredentialProvider, StaticToken,
};
pub use reddit::{build_http_client, RedditSource};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised while talking to the forum API
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Source '{source_name}' is unavailable: {reason}")]
    Unavailable { source_name: String, reason: String },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Comment expansion for submission {submission} exceeded {rounds} rounds")]
    ExpansionLimit { submission: String, rounds: u32 },
}

/// Result type for source operations
pub type SourceResult<T> = Result<T, SourceError>;

/// A top-level post within a source
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    /// Short id (e.g. `abc123`)
    pub id: String,

    /// Type-prefixed id (e.g. `t3_abc123`)
    pub fullname: String,

    pub title: String,

    pub created_at: DateTime<Utc>,

    /// Raw markdown body; empty for link posts
    pub selftext: String,

    /// Rendered HTML body, when the API provides one
    pub selftext_html: Option<String>,
}

impl Submission {
    /// Rendered HTML if present, otherwise the raw body
    pub fn content(&self) -> &str {
        preferred_body(self.selftext_html.as_deref(), &self.selftext)
    }
}

/// A comment with its direct replies
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: String,
    pub fullname: String,
    pub parent_id: String,
    pub body: String,
    pub body_html: Option<String>,
    pub replies: Vec<CommentNode>,
}

impl Comment {
    /// Rendered HTML if present, otherwise the raw body
    pub fn content(&self) -> &str {
        preferred_body(self.body_html.as_deref(), &self.body)
    }
}

/// Placeholder for replies that have not been fetched yet
///
/// An empty `children` list marks a "continue this thread" stub, which is
/// resolved by fetching the parent comment's subtree.
#[derive(Debug, Clone, PartialEq)]
pub struct MoreStub {
    pub id: String,
    pub parent_id: String,
    pub count: u64,
    pub children: Vec<String>,
}

impl MoreStub {
    pub fn is_continue_thread(&self) -> bool {
        self.children.is_empty()
    }
}

/// One node of a comment forest
#[derive(Debug, Clone, PartialEq)]
pub enum CommentNode {
    Comment(Comment),
    More(MoreStub),
}

/// Top-level comments of a submission, possibly containing stubs
pub type CommentForest = Vec<CommentNode>;

/// One page of a newest-first submission listing
#[derive(Debug, Clone, Default)]
pub struct SubmissionPage {
    pub submissions: Vec<Submission>,

    /// Cursor for the following page; `None` when the listing is exhausted
    pub after: Option<String>,
}

/// The external discussion API
///
/// Implementations perform exactly one remote request per call; pacing is
/// the caller's job.
#[async_trait]
pub trait ForumSource: Send + Sync {
    /// Fetches one page of the source's submissions, newest first
    ///
    /// Fails with `SourceError::Unavailable` if the named source does not
    /// exist or cannot be read.
    async fn fetch_submissions(
        &self,
        source_name: &str,
        after: Option<&str>,
    ) -> SourceResult<SubmissionPage>;

    /// Fetches the comment forest of a submission as first served
    async fn fetch_comments(&self, submission: &Submission) -> SourceResult<CommentForest>;

    /// Resolves one stub into the nodes that take its place
    ///
    /// The returned nodes may themselves contain further stubs.
    async fn fetch_more(
        &self,
        submission: &Submission,
        stub: &MoreStub,
    ) -> SourceResult<Vec<CommentNode>>;
}

fn preferred_body<'a>(html: Option<&'a str>, raw: &'a str) -> &'a str {
    match html {
        Some(html) if !html.is_empty() => html,
        _ => raw,
    }
}
