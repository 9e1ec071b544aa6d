//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: config file → token exchange → user and
//! application listings → graph snapshot on disk

use auth0_graph::config::load_config;
use auth0_graph::engine::IngestionEngine;
use auth0_graph::graph::{account_weblink, Entity};
use auth0_graph::state::JobState;
use auth0_graph::Error;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const ALPHABET: &[u8] = b"0123456789abcde";
const SEARCH_CEILING: usize = 1000;

// ============================================================================
// Fake management API
// ============================================================================

fn synthetic_id(mut n: usize) -> String {
    let mut digits = [b'0'; 8];
    for slot in digits.iter_mut().rev() {
        *slot = ALPHABET[n % ALPHABET.len()];
        n /= ALPHABET.len();
    }
    format!("auth0|{}", String::from_utf8_lossy(&digits))
}

/// User search that, like the real one, never reveals more than 1000
/// matches for a query
struct UserSearch {
    ids: Vec<String>,
    requests: Arc<AtomicU64>,
}

impl Respond for UserSearch {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        self.requests.fetch_add(1, Ordering::SeqCst);

        let param = |name: &str| {
            request
                .url
                .query_pairs()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.into_owned())
        };
        let page: usize = param("page").and_then(|v| v.parse().ok()).unwrap_or(0);
        let per_page: usize = param("per_page").and_then(|v| v.parse().ok()).unwrap_or(50);
        let include_totals = param("include_totals").as_deref() == Some("true");
        let suffix = param("q")
            .and_then(|q| q.strip_prefix("user_id:*").map(String::from))
            .unwrap_or_default();

        let matching: Vec<&String> = self.ids.iter().filter(|id| id.ends_with(&suffix)).collect();
        let visible = &matching[..matching.len().min(SEARCH_CEILING)];
        let users: Vec<_> = visible
            .iter()
            .skip(page * per_page)
            .take(per_page)
            .map(|id| json!({"user_id": id, "email": format!("{id}@example.com")}))
            .collect();

        if include_totals {
            ResponseTemplate::new(200).set_body_json(json!({
                "start": page * per_page,
                "limit": per_page,
                "length": users.len(),
                "total": visible.len(),
                "users": users
            }))
        } else {
            ResponseTemplate::new(200).set_body_json(users)
        }
    }
}

/// Application listing, page by page
struct ClientListing {
    ids: Vec<String>,
}

impl Respond for ClientListing {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let param = |name: &str| {
            request
                .url
                .query_pairs()
                .find(|(k, _)| k == name)
                .and_then(|(_, v)| v.parse::<usize>().ok())
        };
        let page = param("page").unwrap_or(0);
        let per_page = param("per_page").unwrap_or(50);

        let clients: Vec<_> = self
            .ids
            .iter()
            .skip(page * per_page)
            .take(per_page)
            .map(|id| json!({"client_id": id, "name": format!("App {id}"), "client_secret": "shh"}))
            .collect();
        ResponseTemplate::new(200).set_body_json(clients)
    }
}

async fn start_tenant(users: usize, clients: usize, scope: &str) -> (MockServer, Arc<AtomicU64>) {
    let server = MockServer::start().await;
    let requests = Arc::new(AtomicU64::new(0));

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "integration-token",
            "expires_in": 86400,
            "scope": scope,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v2/users"))
        .respond_with(UserSearch {
            ids: (0..users).map(synthetic_id).collect(),
            requests: Arc::clone(&requests),
        })
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v2/clients"))
        .respond_with(ClientListing {
            ids: (0..clients).map(|n| format!("client-{n:03}")).collect(),
        })
        .mount(&server)
        .await;

    (server, requests)
}

fn write_config(dir: &std::path::Path, server: &MockServer) -> std::path::PathBuf {
    let path = dir.join("tenant.yaml");
    let yaml = format!(
        r"
clientId: integration-client
clientSecret: integration-secret
domain: https://acme.eu.auth0.com
audience: acme.eu.auth0.com/api/v2
instanceId: acme
apiBaseUrl: {}
http:
  requestsPerSecond: 10000
  burstSize: 10000
",
        server.uri()
    );
    std::fs::write(&path, yaml).unwrap();
    path
}

// ============================================================================
// End-to-end
// ============================================================================

#[tokio::test]
async fn test_ingest_tenant_beyond_search_ceiling() {
    let (server, requests) = start_tenant(2500, 120, "read:users read:clients").await;
    let dir = tempdir().unwrap();
    let config = load_config(write_config(dir.path(), &server)).unwrap();

    let engine = IngestionEngine::new(config).unwrap();
    let stats = engine.run().await.unwrap();

    assert_eq!(stats.users, 2500);
    assert_eq!(stats.clients, 120);
    assert_eq!(stats.relationships, 2620);
    assert_eq!(stats.user_shortfall, 0);
    assert!(stats.user_queries > 1, "root query should have been split");
    assert!(requests.load(Ordering::SeqCst) > stats.user_pages);

    let entities = engine.state().entities().await;
    let mut user_keys: Vec<&str> = entities
        .iter()
        .filter(|e| e.entity_type == "auth0_user")
        .map(|e| e.key.as_str())
        .collect();
    user_keys.sort_unstable();
    user_keys.dedup();
    assert_eq!(user_keys.len(), 2500);

    let account = entities
        .iter()
        .find(|e| e.key == "auth0-account:acme")
        .unwrap();
    assert_eq!(
        account.web_link(),
        Some("https://manage.auth0.com/dashboard/eu/acme/")
    );
}

#[tokio::test]
async fn test_snapshot_round_trip() {
    let (server, _) = start_tenant(40, 3, "read:users read:clients").await;
    let dir = tempdir().unwrap();
    let config = load_config(write_config(dir.path(), &server)).unwrap();
    let output = dir.path().join("graph.json");

    let engine = IngestionEngine::new(config).unwrap();
    engine.run().await.unwrap();
    engine.state().save_to_file(&output).await.unwrap();

    let loaded = JobState::load_from_file(&output).await.unwrap();
    let counts = loaded.type_counts().await;
    assert_eq!(counts.get("auth0_account"), Some(&1));
    assert_eq!(counts.get("auth0_user"), Some(&40));
    assert_eq!(counts.get("auth0_client"), Some(&3));
    assert_eq!(counts.get("auth0_account_has_user"), Some(&40));
    assert_eq!(counts.get("auth0_account_has_client"), Some(&3));

    let raw = std::fs::read_to_string(&output).unwrap();
    assert!(!raw.contains("shh"), "client secret leaked into snapshot");

    let account: Entity = loaded.get_data_as("ACCOUNT_ENTITY").await.unwrap().unwrap();
    assert_eq!(account.key, "auth0-account:acme");
}

#[tokio::test]
async fn test_custom_domain_has_no_weblinks() {
    let (server, _) = start_tenant(2, 1, "read:users read:clients").await;
    let dir = tempdir().unwrap();
    let mut config = load_config(write_config(dir.path(), &server)).unwrap();
    config.domain = "login.acme.com".to_string();
    assert_eq!(account_weblink(&config.domain), "");

    let engine = IngestionEngine::new(config).unwrap();
    engine.run().await.unwrap();

    for entity in engine.state().entities().await {
        if entity.entity_type != "auth0_account" {
            assert_eq!(entity.web_link(), None, "{} has a webLink", entity.key);
        }
    }
}

#[tokio::test]
async fn test_missing_scope_aborts_before_ingestion() {
    let (server, requests) = start_tenant(10, 1, "read:users").await;
    let dir = tempdir().unwrap();
    let config = load_config(write_config(dir.path(), &server)).unwrap();

    let engine = IngestionEngine::new(config).unwrap();
    let err = engine.run().await.unwrap_err();

    match err {
        Error::ProviderAuthorization { missing } => {
            assert_eq!(missing, vec!["read:clients".to_string()]);
        }
        other => panic!("Expected ProviderAuthorization, got {other:?}"),
    }
    // Only the authentication probe reached the user search
    assert_eq!(requests.load(Ordering::SeqCst), 1);
    assert_eq!(engine.state().entity_count().await, 0);
}

#[tokio::test]
async fn test_missing_credentials_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("partial.yaml");
    std::fs::write(&path, "clientId: only-this\n").unwrap();

    let config = load_config(&path).unwrap();
    let err = IngestionEngine::new(config).err().unwrap();

    assert_eq!(
        err.to_string(),
        "Integration validation failed: Config requires all of {clientId, clientSecret, domain, audience}"
    );
}
