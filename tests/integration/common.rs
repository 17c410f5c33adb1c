//! Shared fixtures for the integration tests

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use sublink::config::CrawlerConfig;
use sublink::source::{
    Comment, CommentForest, CommentNode, ForumSource, MoreStub, SourceError, SourceResult,
    Submission, SubmissionPage,
};
use sublink::storage::{LinkStore, StorageError, StorageResult};
use sublink::{CrawlOrchestrator, DomainPatternSet, ExtractedLink};

/// Crawler settings with no request spacing
pub fn fast_crawler_config() -> CrawlerConfig {
    CrawlerConfig {
        request_interval_ms: 0,
        max_expansion_rounds: 100,
    }
}

pub fn good_only() -> DomainPatternSet {
    DomainPatternSet::new([r"good\.com"]).unwrap()
}

pub fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, d, 12, 0, 0).unwrap()
}

pub fn submission(id: &str, title: &str, created_at: DateTime<Utc>, html: &str) -> Submission {
    Submission {
        id: id.to_string(),
        fullname: format!("t3_{}", id),
        title: title.to_string(),
        created_at,
        selftext: String::new(),
        selftext_html: Some(html.to_string()),
    }
}

pub fn comment(id: &str, parent: &str, html: &str, replies: Vec<CommentNode>) -> CommentNode {
    CommentNode::Comment(Comment {
        id: id.to_string(),
        fullname: format!("t1_{}", id),
        parent_id: parent.to_string(),
        body: String::new(),
        body_html: Some(html.to_string()),
        replies,
    })
}

/// In-memory forum with call counting
#[derive(Default)]
pub struct FakeSource {
    /// Listing pages served in order
    pub pages: Vec<Vec<Submission>>,
    pub comments: HashMap<String, CommentForest>,
    pub more: HashMap<String, Vec<CommentNode>>,
    pub unavailable: bool,
    /// Submission id whose comment fetch fails with a server error
    pub fail_comments_for: Option<String>,
    pub calls: AtomicUsize,
}

impl FakeSource {
    pub fn with_pages(pages: Vec<Vec<Submission>>) -> Self {
        Self {
            pages,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ForumSource for FakeSource {
    async fn fetch_submissions(
        &self,
        source_name: &str,
        after: Option<&str>,
    ) -> SourceResult<SubmissionPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.unavailable {
            return Err(SourceError::Unavailable {
                source_name: source_name.to_string(),
                reason: "HTTP 404".to_string(),
            });
        }

        let index = after.map_or(0, |cursor| {
            cursor
                .strip_prefix("page")
                .and_then(|n| n.parse().ok())
                .unwrap_or(0)
        });

        let submissions = self.pages.get(index).cloned().unwrap_or_default();
        let after = (index + 1 < self.pages.len()).then(|| format!("page{}", index + 1));

        Ok(SubmissionPage { submissions, after })
    }

    async fn fetch_comments(&self, submission: &Submission) -> SourceResult<CommentForest> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_comments_for.as_deref() == Some(submission.id.as_str()) {
            return Err(SourceError::Status {
                url: format!("/comments/{}", submission.id),
                status: 503,
            });
        }

        Ok(self.comments.get(&submission.id).cloned().unwrap_or_default())
    }

    async fn fetch_more(
        &self,
        _submission: &Submission,
        stub: &MoreStub,
    ) -> SourceResult<Vec<CommentNode>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.more.get(&stub.id).cloned().unwrap_or_default())
    }
}

/// Store that records every batch and can be told to fail
#[derive(Default)]
pub struct RecordingStore {
    pub batches: Vec<Vec<ExtractedLink>>,
    /// Fail the append call with this zero-based index
    pub fail_on_call: Option<usize>,
    attempts: usize,
}

impl RecordingStore {
    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Default::default()
        }
    }

    pub fn stored_urls(&self) -> Vec<String> {
        self.batches
            .iter()
            .flatten()
            .map(|link| link.url.clone())
            .collect()
    }
}

impl LinkStore for RecordingStore {
    fn append(&mut self, links: &[ExtractedLink]) -> StorageResult<()> {
        let attempt = self.attempts;
        self.attempts += 1;

        if self.fail_on_call == Some(attempt) {
            return Err(StorageError::Database("disk I/O error".to_string()));
        }

        self.batches.push(links.to_vec());
        Ok(())
    }
}

pub fn orchestrator<L: LinkStore>(source: FakeSource, store: L) -> CrawlOrchestrator<FakeSource, L> {
    CrawlOrchestrator::new(source, store, good_only(), &fast_crawler_config())
}
