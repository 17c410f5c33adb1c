//! Command trigger
//!
//! Accepts the raw `source_name` / `cutoff_date` strings of a crawl command,
//! runs the crawl and renders the outcome as JSON: either the ordered list
//! of harvested URLs or a structured error.

use crate::crawler::{CrawlOrchestrator, CrawlRequest};
use crate::source::ForumSource;
use crate::storage::LinkStore;
use crate::{FailureReason, SublinkError};
use serde::Serialize;

/// Error payload of a failed trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerError {
    pub reason: FailureReason,
    pub detail: String,
}

/// Outcome of one trigger invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TriggerResponse {
    /// Matching URLs in discovery order
    Links(Vec<String>),
    Error { error: TriggerError },
}

impl TriggerResponse {
    pub fn failure(err: &SublinkError) -> Self {
        Self::Error {
            error: TriggerError {
                reason: err.reason(),
                detail: err.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Links(_))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Validates the request, runs the crawl and wraps the result
///
/// An invalid request is rejected before the source is contacted.
pub async fn trigger<S: ForumSource, L: LinkStore>(
    orchestrator: &mut CrawlOrchestrator<S, L>,
    source_name: &str,
    cutoff_date: &str,
) -> TriggerResponse {
    match validate(source_name, cutoff_date) {
        Ok(request) => run(orchestrator, &request).await,
        Err(response) => response,
    }
}

/// Builds the crawl request, or the response rejecting it
///
/// Callers that need to acquire resources for the crawl validate first so a
/// rejected request leaves nothing behind.
pub fn validate(source_name: &str, cutoff_date: &str) -> Result<CrawlRequest, TriggerResponse> {
    CrawlRequest::new(source_name, cutoff_date).map_err(|e| {
        tracing::warn!("Rejected crawl request: {}", e);
        TriggerResponse::failure(&e)
    })
}

/// Runs an already validated request
pub async fn run<S: ForumSource, L: LinkStore>(
    orchestrator: &mut CrawlOrchestrator<S, L>,
    request: &CrawlRequest,
) -> TriggerResponse {
    match orchestrator.crawl(request).await {
        Ok(result) => TriggerResponse::Links(result.into_urls()),
        Err(e) => TriggerResponse::failure(&e),
    }
}
