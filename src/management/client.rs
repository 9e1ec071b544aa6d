//! Management API client

use super::types::{Auth0Client, Auth0User, UsersPage};
use crate::auth::AuthConfig;
use crate::config::IngestConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RequestConfig};
use crate::pagination::{
    PageWindow, PagedCollection, ResultPage, SearchableCollection, SuffixQuery,
};
use async_trait::async_trait;
use tracing::{debug, info};

const USERS_PATH: &str = "/api/v2/users";
const CLIENTS_PATH: &str = "/api/v2/clients";

/// Client for the tenant's management API.
///
/// Obtains a token with the client-credentials grant on first use and
/// reuses it until shortly before it expires.
#[derive(Debug)]
pub struct ManagementClient {
    http: HttpClient,
    /// Tenant domain, reported in authentication errors
    domain: String,
    /// Field user suffix searches run against
    search_field: String,
}

impl ManagementClient {
    /// Build a client from a validated config
    pub fn new(config: &IngestConfig) -> Result<Self> {
        let http_config = HttpClientConfig::builder()
            .base_url(config.api_base_url())
            .timeout(config.http.timeout())
            .rate_limit(config.http.rate_limit())
            .build();

        let auth = AuthConfig::ClientCredentials {
            token_url: config.token_url(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            audience: config.audience.clone(),
            scopes: Vec::new(),
        };

        Ok(Self::with_http(
            HttpClient::with_auth(http_config, auth)?,
            config.domain.clone(),
            config.users.search_field.clone(),
        ))
    }

    /// Wrap an already configured HTTP client
    pub fn with_http(
        http: HttpClient,
        domain: impl Into<String>,
        search_field: impl Into<String>,
    ) -> Self {
        Self {
            http,
            domain: domain.into(),
            search_field: search_field.into(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// One page of `GET /api/v2/users`.
    ///
    /// `query` is a Lucene search (`user_id:*0a`); `None` lists everyone.
    /// Without totals the API answers with a bare array and `total` is `None`.
    pub async fn list_users(
        &self,
        query: Option<&str>,
        page: u32,
        per_page: u32,
        include_totals: bool,
    ) -> Result<ResultPage<Auth0User>> {
        let request = RequestConfig::new()
            .query("page", page)
            .query("per_page", per_page)
            .query("include_totals", include_totals)
            .query("search_engine", "v3")
            .query_opt("q", query);

        debug!(?query, page, per_page, include_totals, "Listing users");

        if include_totals {
            let body: UsersPage = self.http.get_json_with_config(USERS_PATH, request).await?;
            Ok(ResultPage::new(body.total, body.users))
        } else {
            let users: Vec<Auth0User> = self.http.get_json_with_config(USERS_PATH, request).await?;
            Ok(ResultPage::new(None, users))
        }
    }

    /// One page of `GET /api/v2/clients`
    pub async fn list_clients(&self, page: u32, per_page: u32) -> Result<Vec<Auth0Client>> {
        let request = RequestConfig::new()
            .query("page", page)
            .query("per_page", per_page);

        debug!(page, per_page, "Listing clients");
        self.http.get_json_with_config(CLIENTS_PATH, request).await
    }

    /// Cheap authenticated call proving the credentials work.
    ///
    /// Any failure, token exchange included, is reported as a provider
    /// authentication error against the tenant domain.
    pub async fn verify_authentication(&self) -> Result<()> {
        match self.list_users(None, 0, 1, false).await {
            Ok(_) => {
                info!(domain = %self.domain, "Authentication verified");
                Ok(())
            }
            Err(e) => Err(Error::ProviderAuthentication {
                endpoint: self.domain.clone(),
                status: e.status(),
                message: e.to_string(),
            }),
        }
    }

    /// Check the token was granted every scope in `required`.
    ///
    /// Passes when the token endpoint did not report scopes at all.
    pub async fn verify_scopes(&self, required: &[&str]) -> Result<()> {
        let Some(auth) = self.http.authenticator() else {
            return Ok(());
        };
        let missing = auth.missing_scopes(required).await?;
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::ProviderAuthorization { missing })
        }
    }
}

#[async_trait]
impl SearchableCollection<Auth0User> for ManagementClient {
    async fn fetch_page(
        &self,
        query: &SuffixQuery,
        window: PageWindow,
        include_totals: bool,
    ) -> Result<ResultPage<Auth0User>> {
        let search = query.to_search(&self.search_field);
        self.list_users(
            search.as_deref(),
            window.page,
            window.per_page,
            include_totals,
        )
        .await
    }
}

#[async_trait]
impl PagedCollection<Auth0Client> for ManagementClient {
    async fn fetch_page(&self, window: PageWindow) -> Result<Vec<Auth0Client>> {
        self.list_clients(window.page, window.per_page).await
    }
}
