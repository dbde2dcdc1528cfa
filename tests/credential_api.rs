//! End-to-end tests for the `/api` credential endpoints

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use secrecy::SecretString;
use serde_json::{json, Value};
use tower::ServiceExt;

use humanity_credentials::{
    api::create_router,
    blockchain::{
        memory::InMemoryLedger,
        services::{
            credentials::CredentialService,
            issuer::{HumanityIssuer, ISSUED_MESSAGE},
        },
    },
    config::Config,
    AppState,
};

const SUBJECT: &str = "0x000000000000000000000000000000000000dEaD";

async fn issuer_server() -> mockito::ServerGuard {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/credentials/issue")
        .match_header("X-API-Token", "test-key")
        .with_header("content-type", "application/json")
        .with_body(json!({ "message": ISSUED_MESSAGE }).to_string())
        .create_async()
        .await;
    server
}

fn create_test_app(issuer_url: String, ledger: Arc<InMemoryLedger>) -> Router {
    let issuer = HumanityIssuer::new(
        reqwest::Client::new(),
        issuer_url,
        SecretString::new("test-key".to_string()),
        "music_artistss",
    );
    let credentials = CredentialService::new(issuer, ledger.clone(), ledger);
    create_router(AppState::new(Config::default(), credentials))
}

async fn call(app: &Router, method: Method, uri: &str, body: Body) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn post(app: &Router, uri: &str, payload: Value) -> (StatusCode, Value) {
    call(
        app,
        Method::POST,
        uri,
        Body::from(serde_json::to_vec(&payload).unwrap()),
    )
    .await
}

#[tokio::test]
async fn test_issue_is_idempotent() {
    let server = issuer_server().await;
    let ledger = Arc::new(InMemoryLedger::new());
    let app = create_test_app(server.url(), ledger.clone());
    let payload = json!({ "subject_address": SUBJECT, "credentialType": "music_artist" });

    let (status, first) = post(&app, "/api/issue-credential", payload.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["success"], json!(true));
    let tx_hash = first["txHash"].as_str().unwrap();
    assert!(tx_hash.starts_with("0x"));
    assert_eq!(tx_hash.len(), 66);

    let (status, second) = post(&app, "/api/issue-credential", payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        second,
        json!({ "success": true, "message": "Credential already issued" })
    );
    assert_eq!(ledger.submitted_transactions(), 1);
}

#[tokio::test]
async fn test_revoke_requires_existing_credential() {
    let server = issuer_server().await;
    let ledger = Arc::new(InMemoryLedger::new());
    let app = create_test_app(server.url(), ledger.clone());
    let payload = json!({ "subject_address": SUBJECT, "credentialType": "music_artist" });

    let (status, body) = post(&app, "/api/revoke-credential", payload.clone()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Credential not issued" }));
    assert_eq!(ledger.submitted_transactions(), 0);

    post(&app, "/api/issue-credential", payload.clone()).await;
    let (status, body) = post(&app, "/api/revoke-credential", payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert!(body["txHash"].as_str().unwrap().starts_with("0x"));
    assert_eq!(ledger.submitted_transactions(), 2);
}

#[tokio::test]
async fn test_check_verification() {
    let server = issuer_server().await;
    let ledger = Arc::new(InMemoryLedger::new());
    let app = create_test_app(server.url(), ledger.clone());

    let (status, body) = post(&app, "/api/check-verification", json!({ "subject_address": SUBJECT })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "verified": false }));

    ledger.set_verified(SUBJECT.parse().unwrap(), true);
    let (_, body) = post(&app, "/api/check-verification", json!({ "subject_address": SUBJECT })).await;
    assert_eq!(body, json!({ "verified": true }));
}

#[tokio::test]
async fn test_credential_details() {
    let server = issuer_server().await;
    let ledger = Arc::new(InMemoryLedger::new());
    let app = create_test_app(server.url(), ledger);

    for credential in ["music_artist", "kyc"] {
        let payload = json!({ "subject_address": SUBJECT, "credentialType": credential });
        let (status, _) = post(&app, "/api/issue-credential", payload).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = post(&app, "/api/credential-details", json!({ "subject_address": SUBJECT })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], json!("2"));
    let types: Vec<&str> = body["types"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t.as_str().unwrap())
        .collect();
    assert_eq!(types.len(), 2);
    assert!(types.contains(&"music_artist"));
    assert!(types.contains(&"kyc"));
}

#[tokio::test]
async fn test_malformed_body_is_an_error() {
    let server = issuer_server().await;
    let app = create_test_app(server.url(), Arc::new(InMemoryLedger::new()));

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/issue-credential",
        Body::from("{not json"),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body["error"].as_str().unwrap().is_empty());

    let (status, body) = post(&app, "/api/check-verification", json!({})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_issuer_unreachable() {
    let ledger = Arc::new(InMemoryLedger::new());
    // Nothing listens on port 1.
    let app = create_test_app("http://127.0.0.1:1".to_string(), ledger.clone());

    let (status, body) = post(
        &app,
        "/api/issue-credential",
        json!({ "subject_address": SUBJECT, "credentialType": "music_artist" }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Failed to call issuer API"));
    assert_eq!(ledger.submitted_transactions(), 0);
}

#[tokio::test]
async fn test_health() {
    let server = issuer_server().await;
    let app = create_test_app(server.url(), Arc::new(InMemoryLedger::new()));

    let (status, body) = call(&app, Method::GET, "/api/health", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}
