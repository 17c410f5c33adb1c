//! Newest-first submission cursor
//!
//! The stream pulls listing pages on demand and never decides when to stop:
//! the caller inspects each element and breaks out once it has seen enough.

use crate::crawler::limiter::RateLimiter;
use crate::crawler::request::TextUnit;
use crate::source::{ForumSource, SourceResult, Submission};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// Lazy, pull-based sequence of a source's submissions
///
/// Each call to `SubmissionStream::new` starts again from the newest
/// submission.
pub struct SubmissionStream<'a> {
    source: &'a dyn ForumSource,
    limiter: &'a RateLimiter,
    source_name: String,
    buffer: VecDeque<Submission>,
    after: Option<String>,
    exhausted: bool,
    pages: u32,
    last_seen: Option<DateTime<Utc>>,
}

impl<'a> SubmissionStream<'a> {
    pub fn new(source: &'a dyn ForumSource, limiter: &'a RateLimiter, source_name: &str) -> Self {
        Self {
            source,
            limiter,
            source_name: source_name.to_string(),
            buffer: VecDeque::new(),
            after: None,
            exhausted: false,
            pages: 0,
            last_seen: None,
        }
    }

    /// Returns the next submission with its own text unit
    ///
    /// `Ok(None)` means the source has no older submissions.
    ///
    /// # Errors
    ///
    /// `SourceError::Unavailable` if the named source cannot be resolved;
    /// any other fetch failure as reported by the source.
    pub async fn next(&mut self) -> SourceResult<Option<(Submission, TextUnit)>> {
        loop {
            if let Some(submission) = self.buffer.pop_front() {
                if self
                    .last_seen
                    .is_some_and(|previous| submission.created_at > previous)
                {
                    tracing::warn!(
                        "Submission {} is newer than its predecessor; listing is out of order",
                        submission.fullname
                    );
                }
                self.last_seen = Some(submission.created_at);

                let unit = TextUnit::for_submission(&submission);
                return Ok(Some((submission, unit)));
            }

            if self.exhausted {
                return Ok(None);
            }

            self.fetch_page().await?;
        }
    }

    /// Number of listing pages fetched so far
    pub fn pages_fetched(&self) -> u32 {
        self.pages
    }

    async fn fetch_page(&mut self) -> SourceResult<()> {
        self.limiter.throttle().await;

        let page = self
            .source
            .fetch_submissions(&self.source_name, self.after.as_deref())
            .await?;
        self.pages += 1;

        tracing::debug!(
            "Fetched page {} of {} ({} submissions)",
            self.pages,
            self.source_name,
            page.submissions.len()
        );

        // An empty page with a cursor would otherwise loop forever.
        if page.after.is_none() || page.submissions.is_empty() {
            self.exhausted = true;
        }

        self.after = page.after;
        self.buffer.extend(page.submissions);
        Ok(())
    }
}
