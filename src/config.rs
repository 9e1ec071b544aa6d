//! Integration configuration
//!
//! This module contains the configuration structures for one ingestion
//! instance, loaded from YAML/JSON or from the environment, and the
//! validation/normalization applied before anything talks to the network.

use crate::error::{Error, Result};
use crate::http::RateLimiterConfig;
use crate::pagination::{
    Alphabet, EnumeratorConfig, DEFAULT_ALPHABET, DEFAULT_CEILING, DEFAULT_MAX_DEPTH,
    MAX_PAGE_SIZE,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

static SCHEME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://").expect("valid regex"));

/// Scopes the management API token must carry
pub const REQUIRED_SCOPES: [&str; 2] = ["read:users", "read:clients"];

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete configuration for one ingestion instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestConfig {
    /// Machine-to-machine application client ID
    #[serde(default)]
    pub client_id: String,

    /// Machine-to-machine application client secret
    #[serde(default)]
    pub client_secret: String,

    /// Tenant domain (`tenant.us.auth0.com`)
    #[serde(default)]
    pub domain: String,

    /// Management API identifier (`https://tenant.us.auth0.com/api/v2/`)
    #[serde(default)]
    pub audience: String,

    /// Identifier of this integration instance, used in entity keys
    #[serde(default = "default_instance_id")]
    pub instance_id: String,

    /// Override for the API origin (defaults to `https://<domain>`)
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// User enumeration settings
    #[serde(default)]
    pub users: UsersConfig,

    /// Application listing settings
    #[serde(default)]
    pub clients: ClientsConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
}

fn default_instance_id() -> String {
    "default".to_string()
}

impl IngestConfig {
    /// Create a config from the four credentials, everything else default
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        domain: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            domain: domain.into(),
            audience: audience.into(),
            instance_id: default_instance_id(),
            api_base_url: None,
            users: UsersConfig::default(),
            clients: ClientsConfig::default(),
            http: HttpConfig::default(),
        }
    }

    /// Check required fields and normalize domain and audience in place.
    ///
    /// The domain loses any scheme; the audience gains `https://` and a
    /// trailing slash and must point at `auth0.com`.
    pub fn validate(&mut self) -> Result<()> {
        if self.client_id.is_empty()
            || self.client_secret.is_empty()
            || self.domain.is_empty()
            || self.audience.is_empty()
        {
            return Err(Error::validation(
                "Config requires all of {clientId, clientSecret, domain, audience}",
            ));
        }

        self.domain = SCHEME.replace(&self.domain, "").into_owned();

        if !SCHEME.is_match(&self.audience) {
            self.audience = format!("https://{}", self.audience);
        }

        if !self.audience.contains("auth0.com") {
            return Err(Error::validation(
                "Problem with config {audience}. Should be a subdomain of auth0.com.",
            ));
        }

        if !self.audience.ends_with('/') {
            self.audience.push('/');
        }

        self.users.enumerator()?.validate()?;
        if self.clients.page_size == 0 || self.clients.page_size > MAX_PAGE_SIZE {
            return Err(Error::invalid_value(
                "clients.pageSize",
                format!("must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }

        Ok(())
    }

    /// Origin all API and token requests go to
    pub fn api_base_url(&self) -> String {
        match &self.api_base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}", self.domain),
        }
    }

    /// Token endpoint of the tenant
    pub fn token_url(&self) -> String {
        format!("{}/oauth/token", self.api_base_url())
    }

    /// Build a config from a key/value map using the environment variable
    /// names (`CLIENT_ID`, `CLIENT_SECRET`, `DOMAIN`, `AUDIENCE`,
    /// `INSTANCE_ID`). Missing keys are left empty for `validate` to report.
    pub fn from_vars(vars: &HashMap<String, String>) -> Self {
        let get = |key: &str| vars.get(key).cloned().unwrap_or_default();
        let mut config = Self::new(
            get("CLIENT_ID"),
            get("CLIENT_SECRET"),
            get("DOMAIN"),
            get("AUDIENCE"),
        );
        if let Some(instance_id) = vars.get("INSTANCE_ID").filter(|v| !v.is_empty()) {
            config.instance_id = instance_id.clone();
        }
        config
    }

    /// Build a config from the process environment
    pub fn from_env() -> Self {
        Self::from_vars(&std::env::vars().collect())
    }
}

/// Load a config file (YAML, or JSON since it is a YAML subset)
pub fn load_config(path: impl AsRef<Path>) -> Result<IngestConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        }
    })?;
    load_config_from_str(&content)
}

/// Parse a config from a YAML or JSON string
pub fn load_config_from_str(content: &str) -> Result<IngestConfig> {
    let config: IngestConfig = serde_yaml::from_str(content)?;
    Ok(config)
}

// ============================================================================
// Users
// ============================================================================

/// Settings for the exhaustive user enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersConfig {
    /// Deepest subdivision level
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    /// Truncation ceiling of the user search
    #[serde(default = "default_ceiling")]
    pub ceiling: u64,

    /// Users per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Symbols user identifiers end with
    #[serde(default = "default_alphabet")]
    pub alphabet: String,

    /// Field the suffix search runs against
    #[serde(default = "default_search_field")]
    pub search_field: String,
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            ceiling: default_ceiling(),
            page_size: default_page_size(),
            alphabet: default_alphabet(),
            search_field: default_search_field(),
        }
    }
}

impl UsersConfig {
    /// Enumerator settings described by this section
    pub fn enumerator(&self) -> Result<EnumeratorConfig> {
        Ok(EnumeratorConfig::default()
            .with_max_depth(self.max_depth)
            .with_ceiling(self.ceiling)
            .with_page_size(self.page_size)
            .with_alphabet(Alphabet::new(&self.alphabet)?))
    }
}

fn default_max_depth() -> u32 {
    DEFAULT_MAX_DEPTH
}

fn default_ceiling() -> u64 {
    DEFAULT_CEILING
}

fn default_page_size() -> u32 {
    MAX_PAGE_SIZE
}

fn default_alphabet() -> String {
    DEFAULT_ALPHABET.to_string()
}

fn default_search_field() -> String {
    "user_id".to_string()
}

// ============================================================================
// Clients
// ============================================================================

/// Settings for the application listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientsConfig {
    /// Applications per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for ClientsConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

// ============================================================================
// HTTP
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Sustained request rate
    #[serde(default = "default_rps")]
    pub requests_per_second: u32,

    /// Requests allowed in a burst
    #[serde(default = "default_burst")]
    pub burst_size: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            requests_per_second: default_rps(),
            burst_size: default_burst(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn rate_limit(&self) -> RateLimiterConfig {
        RateLimiterConfig::new(self.requests_per_second, self.burst_size)
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_rps() -> u32 {
    10
}

fn default_burst() -> u32 {
    10
}
