//! Crawl pipeline
//!
//! This module contains the crawl-and-extract pipeline, including:
//! - Anchor extraction and allow-list filtering
//! - Fixed-spacing request pacing
//! - Newest-first submission streaming
//! - Full comment tree expansion
//! - Overall crawl orchestration

mod comments;
mod extractor;
mod limiter;
mod orchestrator;
mod request;
mod stream;

pub use comments::{CommentTreeWalker, DEFAULT_MAX_EXPANSION_ROUNDS};
pub use extractor::{extract_from_unit, extract_links};
pub use limiter::RateLimiter;
pub use orchestrator::CrawlOrchestrator;
pub use request::{CrawlRequest, CrawlResult, ExtractedLink, TextUnit, CUTOFF_FORMAT};
pub use stream::SubmissionStream;
