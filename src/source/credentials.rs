//! Credential providers
//!
//! The crawler never performs an interactive OAuth flow. It asks a
//! `CredentialProvider` for a bearer token and attaches it to every request.

use crate::config::AuthConfig;
use crate::source::{SourceError, SourceResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// An opaque bearer token
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Supplies an authenticated session to the source client
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn access_token(&self) -> SourceResult<AccessToken>;
}

/// A token issued out of band
#[derive(Debug, Clone)]
pub struct StaticToken {
    token: AccessToken,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: AccessToken::new(token),
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticToken {
    async fn access_token(&self) -> SourceResult<AccessToken> {
        Ok(self.token.clone())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

/// Application-only OAuth grant
///
/// The token is requested on first use and reused for the lifetime of the
/// process.
pub struct ClientCredentials {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    token: OnceCell<AccessToken>,
}

impl ClientCredentials {
    pub fn new(
        client: Client,
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            client,
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token: OnceCell::new(),
        }
    }

    async fn request_token(&self) -> SourceResult<AccessToken> {
        tracing::debug!("Requesting application token from {}", self.token_url);

        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|source| SourceError::Http {
                url: self.token_url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Auth(format!(
                "token endpoint returned HTTP {}",
                status.as_u16()
            )));
        }

        let body: TokenResponse = response.json().await.map_err(|e| SourceError::Decode {
            url: self.token_url.clone(),
            message: e.to_string(),
        })?;

        match (body.access_token, body.error) {
            (Some(token), _) if !token.is_empty() => Ok(AccessToken::new(token)),
            (_, Some(error)) => Err(SourceError::Auth(error)),
            _ => Err(SourceError::Auth(
                "token endpoint returned no access_token".to_string(),
            )),
        }
    }
}

#[async_trait]
impl CredentialProvider for ClientCredentials {
    async fn access_token(&self) -> SourceResult<AccessToken> {
        self.token
            .get_or_try_init(|| self.request_token())
            .await
            .cloned()
    }
}

/// Picks the provider described by the `[auth]` section
///
/// A configured `access-token` wins over client credentials.
pub fn provider_from_config(config: &AuthConfig, client: Client) -> Arc<dyn CredentialProvider> {
    match (&config.access_token, &config.client_id, &config.client_secret) {
        (Some(token), _, _) if !token.trim().is_empty() => Arc::new(StaticToken::new(token.trim())),
        (_, Some(id), Some(secret)) => Arc::new(ClientCredentials::new(
            client,
            config.token_url.clone(),
            id.clone(),
            secret.clone(),
        )),
        // Validation guarantees one of the above; an empty token fails at the API.
        _ => Arc::new(StaticToken::new(String::new())),
    }
}
