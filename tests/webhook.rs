//! Integration tests for the LINE webhook: always `OK`, signature checks and
//! event dispatch.

mod common;

use std::sync::atomic::Ordering;

use common::{Harness, TestServer, test_config};
use confdesk::line::signature::{self, SIGNATURE_HEADER};
use reqwest::StatusCode;

const SECRET: &str = "channel-secret";

async fn deliver(server: &TestServer, body: &str, signature: Option<&str>) -> (StatusCode, String) {
    let mut request = server
        .client()
        .post(server.url("/api/line-webhook"))
        .header("content-type", "application/json")
        .body(body.to_string());
    if let Some(sig) = signature {
        request = request.header(SIGNATURE_HEADER, sig);
    }
    let response = request.send().await.expect("request sent");
    let status = response.status();
    (status, response.text().await.unwrap())
}

fn text_event(user_id: &str, text: &str) -> String {
    format!(
        r#"{{"destination":"Ubot","events":[{{"type":"message","replyToken":"r","timestamp":1700000000000,
        "source":{{"type":"user","userId":"{user_id}"}},
        "message":{{"type":"text","id":"1","text":"{text}"}}}}]}}"#
    )
}

#[tokio::test]
async fn test_follow_sends_welcome() {
    let harness = Harness::default();
    let mut config = test_config();
    config.line.webhook.welcome_message = "Welcome to RustConf!".into();
    let server = TestServer::spawn(harness.state(config)).await.unwrap();

    let body = r#"{"events":[{"type":"follow","source":{"type":"user","userId":"Unew"}}]}"#;
    let (status, text) = deliver(&server, body, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "OK");
    let pushed = harness.messenger.pushed();
    assert_eq!(pushed.len(), 1);
    assert_eq!(pushed[0].to, "Unew");
    assert_eq!(pushed[0].messages[0].text, "Welcome to RustConf!");
}

#[tokio::test]
async fn test_text_forwarded_with_participant_name() {
    let harness = Harness::default();
    harness.store.add_participant("7", "Aiko Tanaka", Some("Ulinked"));
    let mut config = test_config();
    config.line.webhook.forward_to = Some("Cstaffgroup".into());
    let server = TestServer::spawn(harness.state(config)).await.unwrap();

    deliver(&server, &text_event("Ulinked", "Where is room B?"), None).await;
    deliver(&server, &text_event("Ustranger", "hello"), None).await;

    let pushed = harness.messenger.pushed();
    assert_eq!(pushed.len(), 2);
    assert!(pushed.iter().all(|p| p.to == "Cstaffgroup"));
    assert_eq!(pushed[0].messages[0].text, "[Aiko Tanaka] Where is room B?");
    assert_eq!(pushed[1].messages[0].text, "[Ustranger] hello");
}

#[tokio::test]
async fn test_text_not_forwarded_without_target() {
    let harness = Harness::default();
    let server = TestServer::spawn(harness.state(test_config())).await.unwrap();

    let (status, text) = deliver(&server, &text_event("U1", "hi"), None).await;

    assert_eq!((status, text.as_str()), (StatusCode::OK, "OK"));
    assert!(harness.messenger.pushed().is_empty());
}

#[tokio::test]
async fn test_malformed_and_empty_deliveries_still_ok() {
    let harness = Harness::default();
    let server = TestServer::spawn(harness.state(test_config())).await.unwrap();

    for body in ["", "not json", "{}", r#"{"events":[]}"#, r#"{"events":[{"bogus":1}]}"#] {
        let (status, text) = deliver(&server, body, None).await;
        assert_eq!(status, StatusCode::OK, "body {body:?}");
        assert_eq!(text, "OK");
    }
    assert!(harness.messenger.pushed().is_empty());
}

#[tokio::test]
async fn test_push_failure_still_ok() {
    let harness = Harness::default();
    harness.messenger.fail.store(true, Ordering::SeqCst);
    let server = TestServer::spawn(harness.state(test_config())).await.unwrap();

    let body = r#"{"events":[{"type":"follow","source":{"type":"user","userId":"U1"}}]}"#;
    let (status, text) = deliver(&server, body, None).await;

    assert_eq!((status, text.as_str()), (StatusCode::OK, "OK"));
}

#[tokio::test]
async fn test_signature_checked_when_secret_configured() {
    let harness = Harness::default();
    let mut config = test_config();
    config.line.channel_secret = Some(SECRET.into());
    let server = TestServer::spawn(harness.state(config)).await.unwrap();

    let body = r#"{"events":[{"type":"follow","source":{"type":"user","userId":"U1"}}]}"#;

    let (status, text) = deliver(&server, body, Some("bm9wZQ==")).await;
    assert_eq!((status, text.as_str()), (StatusCode::OK, "OK"));
    let (status, _) = deliver(&server, body, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(harness.messenger.pushed().is_empty());

    let good = signature::sign(SECRET, body.as_bytes());
    deliver(&server, body, Some(&good)).await;
    assert_eq!(harness.messenger.pushed().len(), 1);
}

#[tokio::test]
async fn test_later_events_run_after_a_failure() {
    let harness = Harness::default();
    harness.store.failing();
    let mut config = test_config();
    config.line.webhook.forward_to = Some("Cstaff".into());
    let server = TestServer::spawn(harness.state(config)).await.unwrap();

    // Participant lookup fails for the message; the sender id is used instead.
    let body = r#"{"events":[
        {"type":"message","source":{"type":"user","userId":"U1"},"message":{"type":"text","text":"first"}},
        {"type":"unfollow","source":{"type":"user","userId":"U2"}},
        {"type":"follow","source":{"type":"user","userId":"U3"}}
    ]}"#;
    deliver(&server, body, None).await;

    let pushed = harness.messenger.pushed();
    assert_eq!(pushed.len(), 2);
    assert_eq!(pushed[0].messages[0].text, "[U1] first");
    assert_eq!(pushed[1].to, "U3");
}

#[tokio::test]
async fn test_other_methods_still_ok() {
    let harness = Harness::default();
    let server = TestServer::spawn(harness.state(test_config())).await.unwrap();

    for method in [reqwest::Method::GET, reqwest::Method::PUT] {
        let response = server
            .client()
            .request(method.clone(), server.url("/api/line-webhook"))
            .send()
            .await
            .expect("request sent");
        assert_eq!(response.status(), StatusCode::OK, "method {method}");
        assert_eq!(response.text().await.unwrap(), "OK");
    }
    assert!(harness.messenger.pushed().is_empty());
}
