//! Crawl request and result types

use crate::source::Submission;
use crate::SublinkError;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;

/// Date format accepted for the cutoff
pub const CUTOFF_FORMAT: &str = "%Y-%m-%d";

/// One validated crawl invocation
///
/// The cutoff is midnight UTC of the supplied date. Submissions created
/// strictly before it end the crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRequest {
    source_name: String,
    cutoff: DateTime<Utc>,
}

impl CrawlRequest {
    /// Validates and builds a request
    ///
    /// # Errors
    ///
    /// `SublinkError::InvalidRequest` if the source name is empty or contains
    /// characters outside `[A-Za-z0-9_+]`, or if `cutoff_date` is not a
    /// `YYYY-MM-DD` date.
    ///
    /// # Example
    ///
    /// ```
    /// use sublink::CrawlRequest;
    ///
    /// let request = CrawlRequest::new("rust", "2024-01-01").unwrap();
    /// assert_eq!(request.source_name(), "rust");
    /// assert!(CrawlRequest::new("rust", "not-a-date").is_err());
    /// ```
    pub fn new(source_name: &str, cutoff_date: &str) -> Result<Self, SublinkError> {
        let source_name = source_name.trim();
        if source_name.is_empty() {
            return Err(SublinkError::InvalidRequest(
                "Missing source name".to_string(),
            ));
        }

        if !source_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '+')
        {
            return Err(SublinkError::InvalidRequest(format!(
                "Invalid source name '{}'",
                source_name
            )));
        }

        let date = NaiveDate::parse_from_str(cutoff_date.trim(), CUTOFF_FORMAT).map_err(|_| {
            SublinkError::InvalidRequest(format!(
                "Invalid date '{}'. Use YYYY-MM-DD.",
                cutoff_date
            ))
        })?;

        let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| {
            SublinkError::InvalidRequest(format!("Invalid date '{}'", cutoff_date))
        })?;

        Ok(Self {
            source_name: source_name.to_string(),
            cutoff: Utc.from_utc_datetime(&midnight),
        })
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn cutoff(&self) -> DateTime<Utc> {
        self.cutoff
    }

    /// True when a submission created at `created_at` ends the crawl
    ///
    /// A submission created exactly at the cutoff is still processed.
    pub fn is_past_cutoff(&self, created_at: DateTime<Utc>) -> bool {
        created_at < self.cutoff
    }
}

/// One submission body or comment body awaiting extraction
#[derive(Debug, Clone, PartialEq)]
pub struct TextUnit {
    pub raw_content: String,
    pub provenance_title: String,
    pub provenance_timestamp: DateTime<Utc>,
}

impl TextUnit {
    /// The submission's own body, attributed to itself
    pub fn for_submission(submission: &Submission) -> Self {
        Self::attributed(submission.content(), submission)
    }

    /// Any body attributed to `submission`
    pub fn attributed(raw_content: impl Into<String>, submission: &Submission) -> Self {
        Self {
            raw_content: raw_content.into(),
            provenance_title: submission.title.clone(),
            provenance_timestamp: submission.created_at,
        }
    }
}

/// A matching link with the submission it was found under
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedLink {
    pub url: String,
    pub submission_title: String,
    /// RFC 3339 creation time of the submission
    pub submission_date: String,
}

/// All links accumulated by one crawl, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlResult {
    pub links: Vec<ExtractedLink>,
}

impl CrawlResult {
    pub fn into_urls(self) -> Vec<String> {
        self.links.into_iter().map(|l| l.url).collect()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
