/// Crawl state definitions for tracking one crawl request
use std::fmt;

/// Represents the current state of a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    // ===== Active States =====
    /// No crawl has started
    Idle,

    /// Pulling the next submission from the stream
    Fetching,

    /// Resolving "more comments" stubs for the current submission
    ExpandingComments,

    /// Running link extraction over text units
    Extracting,

    /// Appending extracted links to the store
    Persisting,

    // ===== Terminal States =====
    /// The cutoff was reached or the stream was exhausted
    Done,

    /// An unrecoverable error aborted the crawl
    Failed,
}

impl CrawlState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Checks whether moving from `self` to `next` is a legal transition
    ///
    /// A terminal state may restart into `Fetching` so one orchestrator can
    /// serve successive crawl requests.
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        use CrawlState::*;

        match (*self, next) {
            (Idle | Done | Failed, Fetching) => true,
            (Fetching, ExpandingComments | Extracting | Done) => true,
            (ExpandingComments, Extracting | Fetching) => true,
            (Extracting, Persisting) => true,
            (Persisting, Extracting | ExpandingComments | Fetching) => true,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::ExpandingComments => "expanding_comments",
            Self::Extracting => "extracting",
            Self::Persisting => "persisting",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
