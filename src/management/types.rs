//! Management API wire types
//!
//! Fields follow the API's snake_case names. Anything the API sends that is
//! not modelled here is kept in `extra` so raw data stays complete.

use crate::pagination::Identified;
use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};

// ============================================================================
// Users
// ============================================================================

/// Linked identity of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Auth0UserIdentity {
    #[serde(default)]
    pub connection: String,
    #[serde(default)]
    pub user_id: JsonValue,
    #[serde(default)]
    pub provider: String,
    #[serde(rename = "isSocial", default)]
    pub is_social: bool,
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// A user as returned by `GET /api/v2/users`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Auth0User {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identities: Option<Vec<Auth0UserIdentity>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_metadata: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_metadata: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    /// MFA providers the user enrolled with
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multifactor: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logins_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl Auth0User {
    /// Drop free-form metadata, which can hold anything a tenant put there
    #[must_use]
    pub fn redacted(mut self) -> Self {
        self.user_metadata = None;
        self.app_metadata = None;
        self
    }
}

impl Identified for Auth0User {
    fn identifier(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}

/// Body of `GET /api/v2/users` when `include_totals=true`
#[derive(Debug, Clone, Deserialize)]
pub struct UsersPage {
    #[serde(default)]
    pub start: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub length: u64,
    pub total: Option<u64>,
    #[serde(default)]
    pub users: Vec<Auth0User>,
}

// ============================================================================
// Clients (applications)
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JwtConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifetime_in_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_encoded: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scopes: Option<JsonValue>,
    /// HS256 or RS256
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncryptionKey {
    #[serde(rename = "pub", skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

/// Refresh token policy of an application
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefreshTokenSettings {
    /// `rotating` or `non-rotating`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_type: Option<String>,
    /// `expiring` or `non-expiring`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leeway: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_lifetime: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub infinite_token_lifetime: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_token_lifetime: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub infinite_idle_token_lifetime: Option<bool>,
}

/// An application as returned by `GET /api/v2/clients`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Auth0Client {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The legacy "All Applications" client
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    /// spa, native, non_interactive or regular_web
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_first_party: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oidc_conformant: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callbacks: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_origins: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_aliases: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_clients: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_logout_urls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grant_types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt_configuration: Option<JwtConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signing_keys: Option<Vec<JsonValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_key: Option<EncryptionKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sso: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sso_disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cross_origin_auth: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cross_origin_loc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_login_page_on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_login_page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_login_page_preview: Option<String>,
    /// WS-Federation form template
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addons: Option<JsonValue>,
    /// none, client_secret_post or client_secret_basic
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_endpoint_auth_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_metadata: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initiate_login_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_social_login: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<RefreshTokenSettings>,
    /// deny, allow or require
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_usage: Option<String>,
    /// no_prompt or pre_login_prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_require_behavior: Option<String>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl Auth0Client {
    /// Drop secrets and opaque configuration blobs
    #[must_use]
    pub fn redacted(mut self) -> Self {
        self.client_secret = None;
        self.jwt_configuration = None;
        self.signing_keys = None;
        self.encryption_key = None;
        self.addons = None;
        self.client_metadata = None;
        self.mobile = None;
        self.native_social_login = None;
        self
    }
}

impl Identified for Auth0Client {
    fn identifier(&self) -> Option<&str> {
        self.client_id.as_deref()
    }
}
