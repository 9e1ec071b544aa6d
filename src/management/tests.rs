//! Tests for the management API client

use super::*;
use crate::config::IngestConfig;
use crate::error::Error;
use crate::pagination::{
    EnumeratorConfig, ExhaustiveEnumerator, Identified, PagedEnumerator,
};
use futures::future::ready;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(server: &MockServer) -> IngestConfig {
    let mut config = IngestConfig::new(
        "client",
        "secret",
        "tenant.us.auth0.com",
        "https://tenant.us.auth0.com/api/v2/",
    );
    config.api_base_url = Some(server.uri());
    config.http.requests_per_second = 1000;
    config.http.burst_size = 1000;
    config
}

async fn mount_token(server: &MockServer, scope: Option<&str>) {
    let mut body = json!({
        "access_token": "mgmt-token",
        "expires_in": 86400,
        "token_type": "Bearer"
    });
    if let Some(scope) = scope {
        body["scope"] = json!(scope);
    }
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn user(id: &str) -> serde_json::Value {
    json!({
        "user_id": id,
        "email": format!("{id}@example.com"),
        "name": "Test User",
        "identities": [
            {"connection": "Username-Password-Authentication", "user_id": "1", "provider": "auth0", "isSocial": false}
        ],
        "user_metadata": {"favorite_color": "blue"},
        "app_metadata": {"plan": "gold"},
        "last_password_reset": "2021-01-01T00:00:00.000Z"
    })
}

#[tokio::test]
async fn test_list_users_with_totals() {
    let server = MockServer::start().await;
    mount_token(&server, None).await;

    Mock::given(method("GET"))
        .and(path("/api/v2/users"))
        .and(header("Authorization", "Bearer mgmt-token"))
        .and(query_param("page", "0"))
        .and(query_param("per_page", "100"))
        .and(query_param("include_totals", "true"))
        .and(query_param("search_engine", "v3"))
        .and(query_param("q", "user_id:*0a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "start": 0,
            "limit": 100,
            "length": 2,
            "total": 2,
            "users": [user("auth0|100a"), user("auth0|200a")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ManagementClient::new(&test_config(&server)).unwrap();
    let page = client
        .list_users(Some("user_id:*0a"), 0, 100, true)
        .await
        .unwrap();

    assert_eq!(page.total, Some(2));
    assert_eq!(page.returned_count(), 2);

    let first = &page.items[0];
    assert_eq!(first.identifier(), Some("auth0|100a"));
    assert_eq!(first.identities.as_ref().unwrap()[0].provider, "auth0");
    assert!(first.user_metadata.is_some());
    assert_eq!(
        first.extra.get("last_password_reset"),
        Some(&json!("2021-01-01T00:00:00.000Z"))
    );
}

#[tokio::test]
async fn test_list_users_without_totals() {
    let server = MockServer::start().await;
    mount_token(&server, None).await;

    Mock::given(method("GET"))
        .and(path("/api/v2/users"))
        .and(query_param("include_totals", "false"))
        .and(query_param_is_missing("q"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([user("auth0|1")])))
        .mount(&server)
        .await;

    let client = ManagementClient::new(&test_config(&server)).unwrap();
    let page = client.list_users(None, 0, 50, false).await.unwrap();

    assert_eq!(page.total, None);
    assert_eq!(page.returned_count(), 1);
}

#[tokio::test]
async fn test_list_clients() {
    let server = MockServer::start().await;
    mount_token(&server, None).await;

    Mock::given(method("GET"))
        .and(path("/api/v2/clients"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "client_id": "abc",
                "name": "Dashboard",
                "tenant": "tenant",
                "client_secret": "shh",
                "refresh_token": {"expiration_type": "expiring", "token_lifetime": 2592000}
            }
        ])))
        .mount(&server)
        .await;

    let client = ManagementClient::new(&test_config(&server)).unwrap();
    let clients = client.list_clients(1, 25).await.unwrap();

    assert_eq!(clients.len(), 1);
    assert_eq!(clients[0].identifier(), Some("abc"));
    assert_eq!(clients[0].client_secret.as_deref(), Some("shh"));
    assert_eq!(
        clients[0].refresh_token.as_ref().unwrap().token_lifetime,
        Some(2_592_000)
    );
}

#[tokio::test]
async fn test_verify_authentication() {
    let server = MockServer::start().await;
    mount_token(&server, None).await;

    Mock::given(method("GET"))
        .and(path("/api/v2/users"))
        .and(query_param("page", "0"))
        .and(query_param("per_page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = ManagementClient::new(&test_config(&server)).unwrap();
    client.verify_authentication().await.unwrap();
}

#[tokio::test]
async fn test_verify_authentication_api_rejection() {
    let server = MockServer::start().await;
    mount_token(&server, None).await;

    Mock::given(method("GET"))
        .and(path("/api/v2/users"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "statusCode": 401,
            "error": "Unauthorized",
            "message": "Invalid token"
        })))
        .mount(&server)
        .await;

    let client = ManagementClient::new(&test_config(&server)).unwrap();
    let err = client.verify_authentication().await.unwrap_err();

    match err {
        Error::ProviderAuthentication {
            endpoint, status, ..
        } => {
            assert_eq!(endpoint, "tenant.us.auth0.com");
            assert_eq!(status, Some(401));
        }
        other => panic!("Expected ProviderAuthentication, got {other:?}"),
    }
}

#[tokio::test]
async fn test_verify_authentication_token_rejection() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": "access_denied",
            "error_description": "Service not enabled within domain"
        })))
        .mount(&server)
        .await;

    let client = ManagementClient::new(&test_config(&server)).unwrap();
    let err = client.verify_authentication().await.unwrap_err();

    assert!(matches!(
        err,
        Error::ProviderAuthentication {
            status: Some(403),
            ..
        }
    ));
}

#[tokio::test]
async fn test_verify_scopes() {
    let server = MockServer::start().await;
    mount_token(&server, Some("read:users read:clients read:roles")).await;

    let client = ManagementClient::new(&test_config(&server)).unwrap();
    client
        .verify_scopes(&["read:users", "read:clients"])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_verify_scopes_missing() {
    let server = MockServer::start().await;
    mount_token(&server, Some("read:users")).await;

    let client = ManagementClient::new(&test_config(&server)).unwrap();
    let err = client
        .verify_scopes(&["read:users", "read:clients"])
        .await
        .unwrap_err();

    match err {
        Error::ProviderAuthorization { missing } => {
            assert_eq!(missing, vec!["read:clients".to_string()]);
        }
        other => panic!("Expected ProviderAuthorization, got {other:?}"),
    }
}

#[tokio::test]
async fn test_exhaustive_enumeration_over_api() {
    let server = MockServer::start().await;
    mount_token(&server, None).await;

    Mock::given(method("GET"))
        .and(path("/api/v2/users"))
        .and(query_param("page", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "start": 0, "limit": 2, "length": 2, "total": 3,
            "users": [user("auth0|a1"), user("auth0|a2")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v2/users"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "start": 2, "limit": 2, "length": 1, "total": 3,
            "users": [user("auth0|a3")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ManagementClient::new(&test_config(&server)).unwrap();
    let mut seen = Vec::new();
    let stats = ExhaustiveEnumerator::new(&client, EnumeratorConfig::default().with_page_size(2))
        .enumerate(|user: Auth0User| {
            seen.push(user.user_id.unwrap_or_default());
            ready(Ok(()))
        })
        .await
        .unwrap();

    assert_eq!(seen, vec!["auth0|a1", "auth0|a2", "auth0|a3"]);
    assert_eq!(stats.pages, 2);
    assert_eq!(stats.shortfall(), 0);
}

#[tokio::test]
async fn test_paged_enumeration_over_api() {
    let server = MockServer::start().await;
    mount_token(&server, None).await;

    Mock::given(method("GET"))
        .and(path("/api/v2/clients"))
        .and(query_param("page", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"client_id": "one"}, {"client_id": "two"}
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v2/clients"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = ManagementClient::new(&test_config(&server)).unwrap();
    let mut seen = Vec::new();
    let count = PagedEnumerator::new(&client, 2)
        .enumerate(|app: Auth0Client| {
            seen.push(app.client_id.unwrap_or_default());
            ready(Ok(()))
        })
        .await
        .unwrap();

    assert_eq!(count, 2);
    assert_eq!(seen, vec!["one", "two"]);
}

#[test]
fn test_user_redaction() {
    let user: Auth0User = serde_json::from_value(user("auth0|1")).unwrap();
    let raw = serde_json::to_value(user.redacted()).unwrap();

    assert!(raw.get("user_metadata").is_none());
    assert!(raw.get("app_metadata").is_none());
    assert_eq!(raw["email"], "auth0|1@example.com");
    assert_eq!(raw["last_password_reset"], "2021-01-01T00:00:00.000Z");
}

#[test]
fn test_client_redaction() {
    let client: Auth0Client = serde_json::from_value(json!({
        "client_id": "abc",
        "name": "App",
        "client_secret": "shh",
        "jwt_configuration": {"alg": "RS256"},
        "signing_keys": [{"cert": "-----BEGIN CERTIFICATE-----"}],
        "encryption_key": {"pub": "key"},
        "addons": {"aws": {}},
        "client_metadata": {"k": "v"},
        "mobile": {"ios": {}},
        "native_social_login": {"apple": {"enabled": false}},
        "grant_types": ["client_credentials"]
    }))
    .unwrap();

    let raw = serde_json::to_value(client.redacted()).unwrap();
    let keys: Vec<&str> = raw.as_object().unwrap().keys().map(String::as_str).collect();

    for secret in [
        "client_secret",
        "jwt_configuration",
        "signing_keys",
        "encryption_key",
        "addons",
        "client_metadata",
        "mobile",
        "native_social_login",
    ] {
        assert!(!keys.contains(&secret), "{secret} survived redaction");
    }
    assert_eq!(raw["grant_types"], json!(["client_credentials"]));
}
