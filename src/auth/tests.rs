//! Tests for the auth module

use super::*;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_credentials(server: &MockServer, client_id: &str) -> AuthConfig {
    AuthConfig::ClientCredentials {
        token_url: format!("{}/oauth/token", server.uri()),
        client_id: client_id.to_string(),
        client_secret: "my-secret".to_string(),
        audience: "https://tenant.us.auth0.com/api/v2/".to_string(),
        scopes: vec![],
    }
}

#[tokio::test]
async fn test_no_auth() {
    let auth = Authenticator::new(AuthConfig::None);
    let client = reqwest::Client::new();
    let req = client.get("https://example.com/api");

    let built = auth.apply(req).await.unwrap().build().unwrap();
    assert!(built.headers().get("Authorization").is_none());
    assert_eq!(auth.granted_scopes().await.unwrap(), None);
}

#[tokio::test]
async fn test_bearer_auth() {
    let auth = Authenticator::new(AuthConfig::Bearer {
        token: "my-bearer-token".to_string(),
    });

    let client = reqwest::Client::new();
    let req = client.get("https://example.com/api");
    let req = auth.apply(req).await.unwrap();

    let built = req.build().unwrap();
    assert_eq!(
        built.headers().get("Authorization").unwrap(),
        "Bearer my-bearer-token"
    );
}

#[tokio::test]
async fn test_client_credentials() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=my-client"))
        .and(body_string_contains("client_secret=my-secret"))
        .and(body_string_contains(
            "audience=https%3A%2F%2Ftenant.us.auth0.com%2Fapi%2Fv2%2F",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "oauth-token-123",
            "expires_in": 86400,
            "scope": "read:users read:clients",
            "token_type": "Bearer"
        })))
        .mount(&mock_server)
        .await;

    let auth = Authenticator::new(client_credentials(&mock_server, "my-client"));

    let client = reqwest::Client::new();
    let req = client.get("https://example.com/api");
    let req = auth.apply(req).await.unwrap();

    let built = req.build().unwrap();
    assert_eq!(
        built.headers().get("Authorization").unwrap(),
        "Bearer oauth-token-123"
    );
}

#[tokio::test]
async fn test_requested_scopes_are_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("scope=read%3Ausers+read%3Aclients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "scoped",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let auth = Authenticator::new(AuthConfig::ClientCredentials {
        token_url: format!("{}/oauth/token", mock_server.uri()),
        client_id: "client".to_string(),
        client_secret: "secret".to_string(),
        audience: "https://tenant.us.auth0.com/api/v2/".to_string(),
        scopes: vec!["read:users".to_string(), "read:clients".to_string()],
    });

    let client = reqwest::Client::new();
    auth.apply(client.get("https://example.com/api"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_token_caching() {
    let mock_server = MockServer::start().await;

    // This should only be called once due to caching
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "cached-token",
            "expires_in": 3600
        })))
        .expect(1) // Expect exactly 1 call
        .mount(&mock_server)
        .await;

    let auth = Authenticator::new(client_credentials(&mock_server, "client"));
    let client = reqwest::Client::new();

    for _ in 0..3 {
        let req = client.get("https://example.com/api");
        let _ = auth.apply(req).await.unwrap();
    }
    // Scope lookups reuse the cached token as well
    let _ = auth.granted_scopes().await.unwrap();
}

#[tokio::test]
async fn test_expired_token_is_refreshed() {
    let mock_server = MockServer::start().await;

    // Lifetime inside the 30s buffer, so every use refreshes
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "short-lived",
            "expires_in": 5
        })))
        .expect(2)
        .mount(&mock_server)
        .await;

    let auth = Authenticator::new(client_credentials(&mock_server, "client"));
    let client = reqwest::Client::new();

    let _ = auth.apply(client.get("https://example.com/a")).await.unwrap();
    let _ = auth.apply(client.get("https://example.com/b")).await.unwrap();
}

#[tokio::test]
async fn test_granted_scopes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "token",
            "expires_in": 3600,
            "scope": "read:users read:clients"
        })))
        .mount(&mock_server)
        .await;

    let auth = Authenticator::new(client_credentials(&mock_server, "client"));

    assert_eq!(
        auth.granted_scopes().await.unwrap(),
        Some(vec!["read:users".to_string(), "read:clients".to_string()])
    );
}

#[tokio::test]
async fn test_granted_scopes_unreported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "token"
        })))
        .mount(&mock_server)
        .await;

    let auth = Authenticator::new(client_credentials(&mock_server, "client"));

    assert_eq!(auth.granted_scopes().await.unwrap(), None);
}

#[tokio::test]
async fn test_clear_cache() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "token",
            "expires_in": 3600
        })))
        .expect(2) // Expect 2 calls due to cache clear
        .mount(&mock_server)
        .await;

    let auth = Authenticator::new(client_credentials(&mock_server, "client"));
    let client = reqwest::Client::new();

    // First request
    let req1 = client.get("https://example.com/api");
    let _ = auth.apply(req1).await.unwrap();

    // Clear cache
    auth.clear_cache().await;

    // Second request - should fetch new token
    let req2 = client.get("https://example.com/api");
    let _ = auth.apply(req2).await.unwrap();
}

#[tokio::test]
async fn test_token_error_handling() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": "access_denied",
            "error_description": "Unauthorized"
        })))
        .mount(&mock_server)
        .await;

    let auth = Authenticator::new(client_credentials(&mock_server, "bad-client"));

    let client = reqwest::Client::new();
    let req = client.get("https://example.com/api");
    let result = auth.apply(req).await;

    let err = result.unwrap_err();
    assert!(matches!(err, crate::error::Error::OAuth2 { .. }));
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn test_missing_scopes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "token",
            "expires_in": 3600,
            "scope": "read:users"
        })))
        .mount(&mock_server)
        .await;

    let auth = Authenticator::new(client_credentials(&mock_server, "client"));

    assert_eq!(
        auth.missing_scopes(&["read:users", "read:clients"])
            .await
            .unwrap(),
        vec!["read:clients".to_string()]
    );

    let bearer = Authenticator::new(AuthConfig::Bearer {
        token: "t".to_string(),
    });
    assert!(bearer.missing_scopes(&["read:users"]).await.unwrap().is_empty());
}
