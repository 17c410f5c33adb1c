//! Crawl state machine
//!
//! A crawl moves through these states once per submission:
//!
//! ```text
//! Idle -> Fetching -> ExpandingComments -> Extracting -> Persisting -+-> Fetching
//!                                                                    +-> Done
//! ```
//!
//! `Failed` is reachable from every non-terminal state. `Done` and `Failed`
//! are terminal.

mod crawl_state;

pub use crawl_state::CrawlState;
