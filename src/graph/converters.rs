//! Management API records to graph entities

use super::types::Entity;
use super::weblink::{client_weblink, user_weblink};
use crate::error::{Error, Result};
use crate::management::{Auth0Client, Auth0User};

pub const ACCOUNT_ENTITY_TYPE: &str = "auth0_account";
pub const USER_ENTITY_TYPE: &str = "auth0_user";
pub const CLIENT_ENTITY_TYPE: &str = "auth0_client";

const ACCOUNT_NAME: &str = "Auth0 Account";

/// The tenant itself, keyed by integration instance
pub fn account_entity(instance_id: &str, web_link: &str) -> Entity {
    Entity::new(
        format!("auth0-account:{instance_id}"),
        ACCOUNT_ENTITY_TYPE,
        "Account",
    )
    .with_property("name", ACCOUNT_NAME)
    .with_property("displayName", ACCOUNT_NAME)
    .with_property("webLink", web_link)
    .with_raw_data(serde_json::json!({
        "id": ACCOUNT_NAME,
        "name": ACCOUNT_NAME,
    }))
}

/// Map a user. Free-form metadata never reaches the entity, raw data included.
pub fn user_entity(user: &Auth0User, account_weblink: &str) -> Result<Entity> {
    let user = user.clone().redacted();
    let user_id = user
        .user_id
        .clone()
        .ok_or_else(|| Error::validation("user record has no user_id"))?;

    let identities = user
        .identities
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    Ok(Entity::new(&user_id, USER_ENTITY_TYPE, "User")
        .with_property("name", &user.name)
        .with_property("displayName", &user.name)
        .with_property("username", user.username.as_deref().unwrap_or(""))
        .with_property("nickname", &user.nickname)
        .with_property("email", &user.email)
        .with_property("webLink", user_weblink(account_weblink, &user_id))
        .with_property("userId", &user_id)
        .with_property("emailVerified", user.email_verified)
        .with_property("phoneNumber", &user.phone_number)
        .with_property("phoneVerified", user.phone_verified)
        .with_property("createdAt", &user.created_at)
        .with_property("updatedAt", &user.updated_at)
        .with_property("identities", identities)
        .with_property("picture", &user.picture)
        .with_property("multifactor", &user.multifactor)
        .with_property("lastIp", &user.last_ip)
        .with_property("lastLogin", &user.last_login)
        .with_property("loginsCount", user.logins_count)
        .with_property("blocked", user.blocked)
        .with_property("givenName", &user.given_name)
        .with_property("familyName", &user.family_name)
        .with_raw_data(serde_json::to_value(&user)?))
}

/// Map an application. Secrets and opaque blobs are stripped first.
pub fn client_entity(client: &Auth0Client, account_weblink: &str) -> Result<Entity> {
    let client = client.clone().redacted();
    let client_id = client
        .client_id
        .clone()
        .ok_or_else(|| Error::validation("client record has no client_id"))?;
    let refresh = client.refresh_token.clone().unwrap_or_default();

    Ok(Entity::new(&client_id, CLIENT_ENTITY_TYPE, "Application")
        .with_property("name", &client.name)
        .with_property("displayName", &client.name)
        .with_property("webLink", client_weblink(account_weblink, &client_id))
        .with_property("clientId", &client_id)
        .with_property("tenant", &client.tenant)
        .with_property("description", &client.description)
        .with_property("global", client.global)
        .with_property("appType", &client.app_type)
        .with_property("logoUri", &client.logo_uri)
        .with_property("isFirstParty", client.is_first_party)
        .with_property("oidcConformant", client.oidc_conformant)
        .with_property("callbacks", &client.callbacks)
        .with_property("allowedOrigins", &client.allowed_origins)
        .with_property("webOrigins", &client.web_origins)
        .with_property("clientAliases", &client.client_aliases)
        .with_property("allowedClients", &client.allowed_clients)
        .with_property("allowedLogoutUrls", &client.allowed_logout_urls)
        .with_property("grantTypes", &client.grant_types)
        .with_property("sso", client.sso)
        .with_property("ssoDisabled", client.sso_disabled)
        .with_property("crossOriginAuth", client.cross_origin_auth)
        .with_property("crossOriginLoc", &client.cross_origin_loc)
        .with_property("customLoginPageOn", client.custom_login_page_on)
        .with_property("customLoginPage", &client.custom_login_page)
        .with_property("customLoginPagePreview", &client.custom_login_page_preview)
        .with_property("formTemplate", &client.form_template)
        .with_property("tokenEndpointAuthMethod", &client.token_endpoint_auth_method)
        .with_property("initiateLoginUri", &client.initiate_login_uri)
        .with_property("organizationUsage", &client.organization_usage)
        .with_property(
            "organizationRequireBehavior",
            &client.organization_require_behavior,
        )
        // Refresh token policy matters for posture analysis
        .with_property("tokenExpirationType", &refresh.expiration_type)
        .with_property("tokenTokenLifetime", refresh.token_lifetime)
        .with_property("tokenInfiniteTokenLifetime", refresh.infinite_token_lifetime)
        .with_property("tokenIdleTokenLifetime", refresh.idle_token_lifetime)
        .with_property(
            "tokenInfiniteIdleTokenLifetime",
            refresh.infinite_idle_token_lifetime,
        )
        .with_raw_data(serde_json::to_value(&client)?))
}
