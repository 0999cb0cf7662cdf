// Integration tests for `ApiClient` using wiremock.

#![allow(clippy::unwrap_used)]

use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use relaydeck_api::{
    ApiClient, CreateProxyRequest, Error, HealthStatus, ProxyId, ProxyQuery, ProxyStatus,
    SessionToken, UpdateProxyRequest,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let client = ApiClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

fn proxy_json(id: &str, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": format!("Proxy {id}"),
        "serverLocation": "Nairobi",
        "status": status,
        "healthStatus": "healthy",
        "currentActiveStreams": 1,
        "maxConcurrentStreams": 8
    })
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_list_proxies() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/proxies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [proxy_json("p1", "active"), proxy_json("p2", "inactive")]
        })))
        .mount(&server)
        .await;

    let proxies = client.list_proxies(None).await.unwrap();

    assert_eq!(proxies.len(), 2);
    assert_eq!(proxies[0].id, ProxyId::from("p1"));
    assert_eq!(proxies[1].status, ProxyStatus::Inactive);
}

#[tokio::test]
async fn test_list_proxies_forwards_filters() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/proxies"))
        .and(query_param("status", "active"))
        .and(query_param("healthStatus", "healthy"))
        .and(query_param("search", "hall"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [proxy_json("p1", "active")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = ProxyQuery {
        status: Some(ProxyStatus::Active),
        health_status: Some(HealthStatus::Healthy),
        church_branch_id: None,
        search: Some("hall".into()),
    };
    let proxies = client.list_proxies(Some(&query)).await.unwrap();
    assert_eq!(proxies.len(), 1);
}

#[tokio::test]
async fn test_create_proxy_sends_camel_case_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/proxies"))
        .and(body_json(json!({
            "name": "Proxy p9",
            "serverLocation": "Nairobi",
            "maxConcurrentStreams": 8
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "data": proxy_json("p9", "active")
        })))
        .mount(&server)
        .await;

    let req = CreateProxyRequest {
        name: "Proxy p9".into(),
        description: None,
        server_location: "Nairobi".into(),
        max_concurrent_streams: 8,
        church_branch_id: None,
        status: None,
    };
    let created = client.create_proxy(&req).await.unwrap();
    assert_eq!(created.id.as_str(), "p9");
}

#[tokio::test]
async fn test_update_proxy_patches_only_given_fields() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/proxies/p1"))
        .and(body_json(json!({ "status": "maintenance" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": proxy_json("p1", "maintenance")
        })))
        .mount(&server)
        .await;

    let updated = client
        .update_proxy(
            &ProxyId::from("p1"),
            &UpdateProxyRequest::status(ProxyStatus::Maintenance),
        )
        .await
        .unwrap();
    assert_eq!(updated.status, ProxyStatus::Maintenance);
}

#[tokio::test]
async fn test_delete_proxy_accepts_empty_204() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/proxies/p1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    client.delete_proxy(&ProxyId::from("p1")).await.unwrap();
}

#[tokio::test]
async fn test_run_health_check() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/proxies/p1/health-check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "proxyId": "p1",
                "status": "warning",
                "responseTimeMs": 420,
                "checkedAt": "2026-03-01T10:00:00Z",
                "message": "High latency"
            }
        })))
        .mount(&server)
        .await;

    let result = client.run_health_check(&ProxyId::from("p1")).await.unwrap();
    assert_eq!(result.status, HealthStatus::Warning);
    assert_eq!(result.response_time_ms, Some(420));
}

#[tokio::test]
async fn test_session_token_sent_as_bearer() {
    let server = MockServer::start().await;
    let client = ApiClient::from_reqwest(&server.uri(), reqwest::Client::new())
        .unwrap()
        .with_session(SessionToken::new(SecretString::from("tok-123".to_string())));

    Mock::given(method("GET"))
        .and(path("/proxies"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let proxies = client.list_proxies(None).await.unwrap();
    assert!(proxies.is_empty());
}

// ── Error handling tests ────────────────────────────────────────────

#[tokio::test]
async fn test_envelope_failure_on_200() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/proxies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "Proxy name already taken"
        })))
        .mount(&server)
        .await;

    let req = CreateProxyRequest {
        name: "dup".into(),
        description: None,
        server_location: "Nairobi".into(),
        max_concurrent_streams: 2,
        church_branch_id: None,
        status: None,
    };
    let err = client.create_proxy(&req).await.unwrap_err();

    match err {
        Error::Api { message, status } => {
            assert_eq!(message.as_deref(), Some("Proxy name already taken"));
            assert_eq!(status, 200);
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_http_401_is_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/proxies"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client.list_proxies(None).await.unwrap_err();
    assert!(matches!(err, Error::Unauthorized { .. }), "expected auth error, got: {err:?}");
    assert_eq!(err.to_string(), "Authentication required");
}

#[tokio::test]
async fn test_http_500_keeps_server_message() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/proxies/p1"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "success": false,
            "error": "Database unavailable"
        })))
        .mount(&server)
        .await;

    let err = client
        .update_proxy(&ProxyId::from("p1"), &UpdateProxyRequest::status(ProxyStatus::Active))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Api { status: 500, .. }));
    assert_eq!(err.server_message(), Some("Database unavailable"));
}

#[tokio::test]
async fn test_http_404_without_body() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/proxies/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client.delete_proxy(&ProxyId::from("missing")).await.unwrap_err();
    assert!(matches!(err, Error::Api { status: 404, message: None }));
    assert!(err.server_message().is_none());
}

#[tokio::test]
async fn test_success_without_data_is_missing_data() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/proxies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    let err = client.list_proxies(None).await.unwrap_err();
    assert!(matches!(err, Error::MissingData { .. }), "got: {err:?}");
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/proxies"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client.list_proxies(None).await.unwrap_err();
    assert!(matches!(err, Error::Deserialization { .. }), "got: {err:?}");
}

#[tokio::test]
async fn test_expired_session_is_rejected_locally() {
    let server = MockServer::start().await;
    let client = ApiClient::from_reqwest(&server.uri(), reqwest::Client::new())
        .unwrap()
        .with_session(
            SessionToken::new(SecretString::from("old".to_string()))
                .with_expiry(Utc::now() - Duration::minutes(1)),
        );

    Mock::given(method("GET"))
        .and(path("/proxies"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client.list_proxies(None).await.unwrap_err();
    assert!(matches!(err, Error::SessionExpired));
    assert_eq!(err.to_string(), "Session expired. Please log in again.");
}
