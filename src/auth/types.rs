//! Auth configuration types

use chrono::{DateTime, Utc};

/// Authentication configuration
#[derive(Debug, Clone, Default)]
pub enum AuthConfig {
    /// No authentication required
    #[default]
    None,

    /// Pre-issued bearer token
    Bearer {
        /// The bearer token
        token: String,
    },

    /// OAuth2 Client Credentials flow against an audience
    ClientCredentials {
        /// Token endpoint URL
        token_url: String,
        /// Client ID
        client_id: String,
        /// Client secret
        client_secret: String,
        /// API identifier the token is requested for
        audience: String,
        /// Requested scopes (empty = whatever the grant allows)
        scopes: Vec<String>,
    },
}

impl AuthConfig {
    /// Whether this config exchanges credentials for a token
    pub fn needs_token(&self) -> bool {
        matches!(self, AuthConfig::ClientCredentials { .. })
    }
}

/// Cached token with expiration
#[derive(Debug, Clone)]
pub struct CachedToken {
    /// The access token
    pub token: String,
    /// When the token expires
    pub expires_at: Option<DateTime<Utc>>,
    /// Scopes granted with the token, when the endpoint reported them
    pub scopes: Option<Vec<String>>,
}

impl CachedToken {
    /// Create a new cached token
    pub fn new(token: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            token,
            expires_at,
            scopes: None,
        }
    }

    /// Create a token that expires in N seconds from now
    pub fn expires_in(token: String, seconds: i64) -> Self {
        let expires_at = Utc::now() + chrono::Duration::seconds(seconds);
        Self::new(token, Some(expires_at))
    }

    /// Attach the granted scopes from a space-separated `scope` string
    #[must_use]
    pub fn with_scope_string(mut self, scope: &str) -> Self {
        self.scopes = Some(scope.split_whitespace().map(String::from).collect());
        self
    }

    /// Check if the token is expired (with 30 second buffer)
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                let buffer = chrono::Duration::seconds(30);
                Utc::now() + buffer >= expires_at
            }
            None => false, // No expiration = never expires
        }
    }

    /// Scopes from `required` that were not granted.
    ///
    /// Empty when the endpoint did not report scopes at all.
    pub fn missing_scopes(&self, required: &[&str]) -> Vec<String> {
        match &self.scopes {
            Some(granted) => required
                .iter()
                .filter(|scope| !granted.iter().any(|g| g == *scope))
                .map(|scope| (*scope).to_string())
                .collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod type_tests {
    use super::*;

    #[test]
    fn test_cached_token_not_expired() {
        let token = CachedToken::expires_in("test".to_string(), 3600);
        assert!(!token.is_expired());
    }

    #[test]
    fn test_cached_token_expired() {
        let token = CachedToken::expires_in("test".to_string(), -100);
        assert!(token.is_expired());
    }

    #[test]
    fn test_cached_token_inside_buffer_is_expired() {
        let token = CachedToken::expires_in("test".to_string(), 10);
        assert!(token.is_expired());
    }

    #[test]
    fn test_cached_token_no_expiration() {
        let token = CachedToken::new("test".to_string(), None);
        assert!(!token.is_expired());
    }

    #[test]
    fn test_missing_scopes() {
        let token = CachedToken::new("t".to_string(), None)
            .with_scope_string("read:users  read:roles");
        assert_eq!(
            token.missing_scopes(&["read:users", "read:clients"]),
            vec!["read:clients".to_string()]
        );

        let unreported = CachedToken::new("t".to_string(), None);
        assert!(unreported.missing_scopes(&["read:users"]).is_empty());
    }

    #[test]
    fn test_auth_config_default() {
        let config = AuthConfig::default();
        assert!(matches!(config, AuthConfig::None));
        assert!(!config.needs_token());
    }
}
