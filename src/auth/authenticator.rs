//! Authenticator implementation
//!
//! Handles applying authentication to requests and managing token refresh.

use super::types::{AuthConfig, CachedToken};
use crate::error::{Error, Result};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Authenticator handles applying authentication to HTTP requests
pub struct Authenticator {
    /// Auth configuration
    config: AuthConfig,
    /// Cached token for the client-credentials grant
    cached_token: Arc<RwLock<Option<CachedToken>>>,
    /// HTTP client for token requests
    http_client: Client,
}

impl Authenticator {
    /// Create a new authenticator with the given config
    pub fn new(config: AuthConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Create an authenticator with a custom HTTP client
    pub fn with_client(config: AuthConfig, http_client: Client) -> Self {
        Self {
            config,
            cached_token: Arc::new(RwLock::new(None)),
            http_client,
        }
    }

    /// Apply authentication to a request builder
    pub async fn apply(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        match &self.config {
            AuthConfig::None => Ok(req),
            AuthConfig::Bearer { token } => Ok(req.bearer_auth(token)),
            AuthConfig::ClientCredentials { .. } => {
                let token = self.current_token().await?;
                Ok(req.bearer_auth(token.token))
            }
        }
    }

    /// Scopes granted to the current token.
    ///
    /// Exchanges credentials first if nothing is cached. `None` when the
    /// auth type carries no scope information.
    pub async fn granted_scopes(&self) -> Result<Option<Vec<String>>> {
        if !self.config.needs_token() {
            return Ok(None);
        }
        Ok(self.current_token().await?.scopes)
    }

    /// Scopes from `required` the current token lacks.
    ///
    /// Empty when every scope was granted or none were reported.
    pub async fn missing_scopes(&self, required: &[&str]) -> Result<Vec<String>> {
        if !self.config.needs_token() {
            return Ok(Vec::new());
        }
        Ok(self.current_token().await?.missing_scopes(required))
    }

    /// Get a valid token, refreshing if necessary
    async fn current_token(&self) -> Result<CachedToken> {
        // Check if we have a valid cached token
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if !token.is_expired() {
                    return Ok(token.clone());
                }
            }
        }

        // Need to refresh - acquire write lock
        let mut cached = self.cached_token.write().await;

        // Double-check after acquiring write lock (another task might have refreshed)
        if let Some(token) = cached.as_ref() {
            if !token.is_expired() {
                return Ok(token.clone());
            }
        }

        let new_token = self.fetch_new_token().await?;
        *cached = Some(new_token.clone());

        Ok(new_token)
    }

    async fn fetch_new_token(&self) -> Result<CachedToken> {
        match &self.config {
            AuthConfig::ClientCredentials {
                token_url,
                client_id,
                client_secret,
                audience,
                scopes,
            } => {
                self.fetch_client_credentials(token_url, client_id, client_secret, audience, scopes)
                    .await
            }
            _ => Err(Error::auth(
                "Token refresh not supported for this auth type",
            )),
        }
    }

    /// Exchange client credentials for an access token
    async fn fetch_client_credentials(
        &self,
        token_url: &str,
        client_id: &str,
        client_secret: &str,
        audience: &str,
        scopes: &[String],
    ) -> Result<CachedToken> {
        let mut form = vec![
            ("grant_type", "client_credentials".to_string()),
            ("client_id", client_id.to_string()),
            ("client_secret", client_secret.to_string()),
            ("audience", audience.to_string()),
        ];

        if !scopes.is_empty() {
            form.push(("scope", scopes.join(" ")));
        }

        debug!(token_url, client_id, audience, "Requesting access token");

        let response = self
            .http_client
            .post(token_url)
            .form(&form)
            .send()
            .await
            .map_err(Error::Http)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::OAuth2 {
                status: Some(status),
                message: format!("Token request failed with status {status}: {body}"),
            });
        }

        let token_response: TokenResponse = response.json().await.map_err(Error::Http)?;
        Ok(token_response.into_cached_token())
    }

    /// Clear the cached token (useful for testing or forced refresh)
    pub async fn clear_cache(&self) {
        let mut cached = self.cached_token.write().await;
        *cached = None;
    }

    /// Get the current auth config
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }
}

/// OAuth2 token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
}

impl TokenResponse {
    fn into_cached_token(self) -> CachedToken {
        let token = match self.expires_in {
            Some(secs) => CachedToken::expires_in(self.access_token, secs),
            None => CachedToken::new(self.access_token, None),
        };
        match self.scope {
            Some(scope) => token.with_scope_string(&scope),
            None => token,
        }
    }
}
