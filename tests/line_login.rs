//! Integration tests for LINE Login bridging.

mod common;

use std::sync::atomic::Ordering;

use common::{Harness, TestServer, test_config};
use reqwest::StatusCode;
use serde_json::{Value, json};

const SUBJECT: &str = "U4AF4980629B1E5E2A84E0A6A4E2C0F11";

async fn post_login(server: &TestServer, body: Value) -> (StatusCode, Value) {
    let response = server
        .client()
        .post(server.url("/api/line-login"))
        .json(&body)
        .send()
        .await
        .expect("request sent");
    let status = response.status();
    (status, response.json().await.expect("json body"))
}

#[tokio::test]
async fn test_login_issues_magic_link() {
    let harness = Harness::default();
    harness.verifier.accept("good-token", SUBJECT, Some("Aiko"));
    let server = TestServer::spawn(harness.state(test_config())).await.unwrap();

    let (status, body) = post_login(
        &server,
        json!({
            "id_token": "good-token",
            "line_user_id": SUBJECT,
            "name": "Someone Else",
            "picture": "https://profile.example/p.png",
            "redirect_to": "https://app.example.org/schedule"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let email = "line_u4af4980629b1e5e2a84e0a6a4e2c0f11@line.local";
    assert_eq!(body["lineUserId"], SUBJECT);
    assert_eq!(body["userId"], format!("user-{email}"));
    assert!(body["url"].as_str().unwrap().contains("token="));

    let calls = harness.verifier.calls.lock().unwrap().clone();
    assert_eq!(calls, vec![("good-token".to_string(), "1650000000".to_string())]);

    let links = harness.store.magic_links.lock().unwrap().clone();
    assert_eq!(
        links,
        vec![(
            email.to_string(),
            Some("https://app.example.org/schedule".to_string())
        )]
    );

    let accounts = harness.store.line_accounts.lock().unwrap().clone();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].line_user_id, SUBJECT);
    // Verified claims win; caller values only fill gaps.
    assert_eq!(accounts[0].display_name.as_deref(), Some("Aiko"));
    assert_eq!(
        accounts[0].picture_url.as_deref(),
        Some("https://profile.example/p.png")
    );
}

#[tokio::test]
async fn test_repeat_login_reuses_user() {
    let harness = Harness::default();
    harness.verifier.accept("good-token", SUBJECT, None);
    let server = TestServer::spawn(harness.state(test_config())).await.unwrap();

    let first = post_login(&server, json!({ "id_token": "good-token" })).await;
    let second = post_login(&server, json!({ "id_token": "good-token" })).await;

    assert_eq!(first.0, StatusCode::OK);
    assert_eq!(second.0, StatusCode::OK);
    assert_eq!(first.1["userId"], second.1["userId"]);
    assert_eq!(harness.store.auth_users.lock().unwrap().len(), 1);
    assert_eq!(harness.store.line_accounts.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_default_redirect_applies() {
    let harness = Harness::default();
    harness.verifier.accept("good-token", SUBJECT, None);
    let mut config = test_config();
    config.line.login.default_redirect = Some("https://app.example.org/".into());
    let server = TestServer::spawn(harness.state(config)).await.unwrap();

    let (status, _) = post_login(&server, json!({ "id_token": "good-token", "redirect_to": "  " })).await;

    assert_eq!(status, StatusCode::OK);
    let links = harness.store.magic_links.lock().unwrap().clone();
    assert_eq!(links[0].1.as_deref(), Some("https://app.example.org/"));
}

#[tokio::test]
async fn test_missing_id_token() {
    let harness = Harness::default();
    let server = TestServer::spawn(harness.state(test_config())).await.unwrap();

    for body in [json!({}), json!({ "id_token": "" }), json!({ "id_token": "   " })] {
        let (status, body) = post_login(&server, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "id_token is required");
    }
    assert!(harness.verifier.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_json() {
    let harness = Harness::default();
    let server = TestServer::spawn(harness.state(test_config())).await.unwrap();

    let response = server
        .client()
        .post(server.url("/api/line-login"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Invalid JSON body");
}

#[tokio::test]
async fn test_wrong_method() {
    let harness = Harness::default();
    let server = TestServer::spawn(harness.state(test_config())).await.unwrap();

    let response = server
        .client()
        .get(server.url("/api/line-login"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Method not allowed");
}

#[tokio::test]
async fn test_rejected_token_writes_nothing() {
    let harness = Harness::default();
    let server = TestServer::spawn(harness.state(test_config())).await.unwrap();

    let (status, body) = post_login(&server, json!({ "id_token": "forged" })).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid id_token");
    assert!(harness.store.auth_users.lock().unwrap().is_empty());
    assert!(harness.store.magic_links.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_claimed_identity_must_match_token() {
    let harness = Harness::default();
    harness.verifier.accept("good-token", SUBJECT, None);
    let server = TestServer::spawn(harness.state(test_config())).await.unwrap();

    let (status, _) = post_login(
        &server,
        json!({ "id_token": "good-token", "line_user_id": "Uattacker" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(harness.store.auth_users.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_redirect_outside_allow_list() {
    let harness = Harness::default();
    harness.verifier.accept("good-token", SUBJECT, None);
    let mut config = test_config();
    config.line.login.allowed_redirects = vec!["https://app.example.org/".into()];
    let server = TestServer::spawn(harness.state(config)).await.unwrap();

    let (status, _) = post_login(
        &server,
        json!({ "id_token": "good-token", "redirect_to": "https://evil.example/" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(harness.store.magic_links.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unconfigured_channel() {
    let harness = Harness::default();
    let mut config = test_config();
    config.line.login.channel_id = None;
    let server = TestServer::spawn(harness.state(config)).await.unwrap();

    let (status, body) = post_login(&server, json!({ "id_token": "anything" })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "LINE login is not configured");
}

#[tokio::test]
async fn test_upstream_failures_are_server_errors() {
    let harness = Harness::default();
    harness.verifier.fail.store(true, Ordering::SeqCst);
    let server = TestServer::spawn(harness.state(test_config())).await.unwrap();
    let (status, _) = post_login(&server, json!({ "id_token": "good-token" })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let harness = Harness::default();
    harness.verifier.accept("good-token", SUBJECT, None);
    harness.store.failing();
    let server = TestServer::spawn(harness.state(test_config())).await.unwrap();
    let (status, body) = post_login(&server, json!({ "id_token": "good-token" })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Failed to create login link");
}

#[tokio::test]
async fn test_redirect_lookalike_hosts_rejected() {
    let harness = Harness::default();
    harness.verifier.accept("good-token", SUBJECT, None);
    let mut config = test_config();
    config.line.login.allowed_redirects = vec!["https://app.example.org".into()];
    let server = TestServer::spawn(harness.state(config)).await.unwrap();

    for redirect in ["https://app.example.org.evil/", "https://app.example.org@evil/"] {
        let (status, _) = post_login(
            &server,
            json!({ "id_token": "good-token", "redirect_to": redirect }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "redirect {redirect}");
    }
    assert!(harness.store.magic_links.lock().unwrap().is_empty());

    let (status, _) = post_login(
        &server,
        json!({ "id_token": "good-token", "redirect_to": "https://app.example.org/schedule" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
