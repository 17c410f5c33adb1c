//! Integration tests for Sublink
//!
//! Crawls run against an in-memory forum or a wiremock-backed Reddit API,
//! and the binary is exercised directly.

mod cli_tests;
mod common;
mod reddit_tests;
