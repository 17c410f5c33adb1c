//! Reddit implementation of `ForumSource`
//!
//! Talks to the OAuth JSON API (`https://oauth.reddit.com` by default):
//! - `GET /r/{name}/new` for newest-first submission pages
//! - `GET /comments/{id}` for a submission's comment forest
//! - `GET /api/morechildren` for "load more" stubs
//! - `GET /comments/{id}/_/{comment}` for "continue this thread" stubs

use crate::config::{Config, SourceConfig};
use crate::source::credentials::{provider_from_config, CredentialProvider};
use crate::source::listing::{
    assemble_tree, comment_forest, submission_page, Listing, MoreChildrenResponse,
};
use crate::source::{
    CommentForest, CommentNode, ForumSource, MoreStub, SourceError, SourceResult, Submission,
    SubmissionPage,
};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Maximum number of comment ids the morechildren endpoint accepts per call
pub const MORE_CHILDREN_BATCH: usize = 100;

/// Builds an HTTP client with proper configuration
///
/// Redirects are not followed: the API answers requests for unknown
/// communities with a redirect to its search page.
pub fn build_http_client(config: &SourceConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Authenticated client for the Reddit API
pub struct RedditSource {
    client: Client,
    api_base: String,
    page_size: u32,
    credentials: Arc<dyn CredentialProvider>,
}

impl RedditSource {
    /// Creates a source client from its parts
    pub fn new(
        client: Client,
        api_base: impl Into<String>,
        page_size: u32,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            page_size,
            credentials,
        }
    }

    /// Creates a source client from the loaded configuration
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let client = build_http_client(&config.source).map_err(|source| SourceError::Http {
            url: config.source.api_base.clone(),
            source,
        })?;
        let credentials = provider_from_config(&config.auth, client.clone());

        Ok(Self::new(
            client,
            config.source.api_base.clone(),
            config.source.page_size,
            credentials,
        ))
    }

    /// Sends an authenticated GET request
    async fn get(&self, path: &str, query: &[(&str, String)]) -> SourceResult<(String, Response)> {
        let url = format!("{}{}", self.api_base, path);
        let token = self.credentials.access_token().await?;

        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token.secret())
            .query(query)
            .send()
            .await
            .map_err(|source| SourceError::Http {
                url: url.clone(),
                source,
            })?;

        Ok((url, response))
    }

    /// Checks the status and decodes a JSON body
    async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> SourceResult<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let text = response.text().await.map_err(|source| SourceError::Http {
            url: url.to_string(),
            source,
        })?;

        serde_json::from_str(&text).map_err(|e| SourceError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// Fetches `/comments/{id}` style endpoints and returns the comment listing
    async fn fetch_thread(&self, path: &str) -> SourceResult<CommentForest> {
        let (url, response) = self
            .get(path, &[("raw_json", "1".to_string())])
            .await?;

        // [submission listing, comment listing]
        let mut listings: Vec<Listing> = Self::decode(&url, response).await?;
        if listings.len() < 2 {
            return Err(SourceError::Decode {
                url,
                message: format!("expected 2 listings, got {}", listings.len()),
            });
        }

        comment_forest(listings.swap_remove(1))
            .map_err(|message| SourceError::Decode { url, message })
    }

    async fn fetch_more_children(
        &self,
        submission: &Submission,
        stub: &MoreStub,
    ) -> SourceResult<Vec<CommentNode>> {
        let batch = stub.children.len().min(MORE_CHILDREN_BATCH);
        let (ids, rest) = stub.children.split_at(batch);

        let (url, response) = self
            .get(
                "/api/morechildren",
                &[
                    ("api_type", "json".to_string()),
                    ("raw_json", "1".to_string()),
                    ("link_id", submission.fullname.clone()),
                    ("children", ids.join(",")),
                ],
            )
            .await?;

        let body: MoreChildrenResponse = Self::decode(&url, response).await?;
        if !body.json.errors.is_empty() {
            return Err(SourceError::Decode {
                url,
                message: format!("API errors: {:?}", body.json.errors),
            });
        }

        let things = body.json.data.map(|d| d.things).unwrap_or_default();
        let mut nodes = assemble_tree(things).map_err(|message| SourceError::Decode {
            url: url.clone(),
            message,
        })?;

        if !rest.is_empty() {
            tracing::debug!(
                "Stub {} has {} ids beyond this batch, re-queueing",
                stub.id,
                rest.len()
            );
            nodes.push(CommentNode::More(MoreStub {
                id: stub.id.clone(),
                parent_id: stub.parent_id.clone(),
                count: stub.count.saturating_sub(batch as u64),
                children: rest.to_vec(),
            }));
        }

        Ok(nodes)
    }

    async fn fetch_continued_thread(
        &self,
        submission: &Submission,
        stub: &MoreStub,
    ) -> SourceResult<Vec<CommentNode>> {
        let comment_id = stub
            .parent_id
            .strip_prefix("t1_")
            .unwrap_or(&stub.parent_id);
        let path = format!("/comments/{}/_/{}", submission.id, comment_id);

        let forest = self.fetch_thread(&path).await?;

        // The thread is re-rooted at the parent comment; its replies replace the stub.
        let replies = forest.into_iter().find_map(|node| match node {
            CommentNode::Comment(c) if c.fullname == stub.parent_id => Some(c.replies),
            _ => None,
        });

        Ok(replies.unwrap_or_default())
    }
}

#[async_trait]
impl ForumSource for RedditSource {
    async fn fetch_submissions(
        &self,
        source_name: &str,
        after: Option<&str>,
    ) -> SourceResult<SubmissionPage> {
        let mut query = vec![
            ("limit", self.page_size.to_string()),
            ("raw_json", "1".to_string()),
        ];
        if let Some(after) = after {
            query.push(("after", after.to_string()));
        }

        let (url, response) = self
            .get(&format!("/r/{}/new", source_name), &query)
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND
            || status == StatusCode::FORBIDDEN
            || status.is_redirection()
        {
            return Err(SourceError::Unavailable {
                source_name: source_name.to_string(),
                reason: format!("HTTP {}", status.as_u16()),
            });
        }

        let listing: Listing = Self::decode(&url, response).await?;
        submission_page(listing).map_err(|message| SourceError::Decode { url, message })
    }

    async fn fetch_comments(&self, submission: &Submission) -> SourceResult<CommentForest> {
        self.fetch_thread(&format!("/comments/{}", submission.id))
            .await
    }

    async fn fetch_more(
        &self,
        submission: &Submission,
        stub: &MoreStub,
    ) -> SourceResult<Vec<CommentNode>> {
        if stub.is_continue_thread() {
            self.fetch_continued_thread(submission, stub).await
        } else {
            self.fetch_more_children(submission, stub).await
        }
    }
}
