//! Crawl orchestration
//!
//! Drives one crawl request end to end:
//! 1. Pull submissions newest-first until one is older than the cutoff
//! 2. Extract and persist links from the submission's own body
//! 3. Fully expand the comment tree and extract and persist per comment
//!
//! Every batch is appended as soon as it is extracted, so a crawl that
//! fails partway has already stored everything it processed. Errors are not
//! retried; they end the crawl and are returned to the caller.

use crate::config::CrawlerConfig;
use crate::crawler::comments::CommentTreeWalker;
use crate::crawler::extractor::extract_from_unit;
use crate::crawler::limiter::RateLimiter;
use crate::crawler::request::{CrawlRequest, CrawlResult, TextUnit};
use crate::crawler::stream::SubmissionStream;
use crate::filter::DomainPatternSet;
use crate::source::ForumSource;
use crate::state::CrawlState;
use crate::storage::LinkStore;
use crate::SublinkError;
use std::time::Instant;

/// Crawl driver owning the source session, the store and the allow-list
pub struct CrawlOrchestrator<S, L> {
    source: S,
    store: L,
    patterns: DomainPatternSet,
    limiter: RateLimiter,
    max_expansion_rounds: u32,
    state: CrawlState,
}

impl<S: ForumSource, L: LinkStore> CrawlOrchestrator<S, L> {
    /// Creates a new orchestrator
    ///
    /// # Arguments
    ///
    /// * `source` - Authenticated forum API session
    /// * `store` - Sink for extracted links
    /// * `patterns` - Allow-list every stored link must match
    /// * `config` - Request spacing and expansion bounds
    pub fn new(source: S, store: L, patterns: DomainPatternSet, config: &CrawlerConfig) -> Self {
        Self {
            source,
            store,
            patterns,
            limiter: RateLimiter::from_config(config),
            max_expansion_rounds: config.max_expansion_rounds,
            state: CrawlState::Idle,
        }
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    pub fn store(&self) -> &L {
        &self.store
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Runs one crawl to completion or failure
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlResult)` - All links found, in discovery order
    /// * `Err(SublinkError)` - The first error hit; links appended before it
    ///   remain stored
    pub async fn crawl(&mut self, request: &CrawlRequest) -> Result<CrawlResult, SublinkError> {
        advance(&mut self.state, CrawlState::Fetching)?;

        tracing::info!(
            "Starting crawl of '{}' back to {}",
            request.source_name(),
            request.cutoff().format("%Y-%m-%d")
        );
        let start_time = Instant::now();

        match self.run(request).await {
            Ok(result) => {
                advance(&mut self.state, CrawlState::Done)?;
                tracing::info!(
                    "Crawl of '{}' completed: {} links in {:?}",
                    request.source_name(),
                    result.len(),
                    start_time.elapsed()
                );
                Ok(result)
            }
            Err(e) => {
                tracing::error!(
                    "Crawl of '{}' failed in state {}: {}",
                    request.source_name(),
                    self.state,
                    e
                );
                if !self.state.is_terminal() {
                    self.state = CrawlState::Failed;
                }
                Err(e)
            }
        }
    }

    async fn run(&mut self, request: &CrawlRequest) -> Result<CrawlResult, SublinkError> {
        let mut stream = SubmissionStream::new(&self.source, &self.limiter, request.source_name());
        let walker = CommentTreeWalker::new(&self.source, &self.limiter, self.max_expansion_rounds);

        let mut result = CrawlResult::default();
        let mut submissions = 0u64;

        loop {
            let Some((submission, unit)) = stream.next().await? else {
                tracing::info!("Submission stream exhausted");
                break;
            };

            if request.is_past_cutoff(submission.created_at) {
                tracing::info!(
                    "Reached cutoff at submission {} ({})",
                    submission.fullname,
                    submission.created_at.to_rfc3339()
                );
                break;
            }

            tracing::info!(
                "Processing submission {} '{}' ({})",
                submission.fullname,
                submission.title,
                submission.created_at.to_rfc3339()
            );

            let found = record_unit(
                &mut self.state,
                &mut self.store,
                &self.patterns,
                &unit,
                &mut result,
            )?;
            tracing::debug!("Submission body yielded {} links", found);

            advance(&mut self.state, CrawlState::ExpandingComments)?;
            let comments = walker.walk(&submission).await?;

            let mut from_comments = 0;
            for unit in &comments {
                from_comments += record_unit(
                    &mut self.state,
                    &mut self.store,
                    &self.patterns,
                    unit,
                    &mut result,
                )?;
            }
            tracing::debug!(
                "{} comments yielded {} links",
                comments.len(),
                from_comments
            );

            advance(&mut self.state, CrawlState::Fetching)?;
            submissions += 1;
        }

        tracing::info!(
            "Processed {} submissions over {} listing pages, {} API requests",
            submissions,
            stream.pages_fetched(),
            self.limiter.requests()
        );

        Ok(result)
    }
}

/// Extracts one unit, appends the batch to the store, then to the result
///
/// The store is called even for an empty batch.
fn record_unit<L: LinkStore>(
    state: &mut CrawlState,
    store: &mut L,
    patterns: &DomainPatternSet,
    unit: &TextUnit,
    result: &mut CrawlResult,
) -> Result<usize, SublinkError> {
    advance(state, CrawlState::Extracting)?;
    let links = extract_from_unit(unit, patterns);

    advance(state, CrawlState::Persisting)?;
    store.append(&links)?;

    let count = links.len();
    result.links.extend(links);
    Ok(count)
}

fn advance(state: &mut CrawlState, next: CrawlState) -> Result<(), SublinkError> {
    if !state.can_transition_to(next) {
        return Err(SublinkError::InvalidTransition {
            from: *state,
            to: next,
        });
    }
    tracing::trace!("Crawl state {} -> {}", state, next);
    *state = next;
    Ok(())
}
