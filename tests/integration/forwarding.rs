//! Passive-check forwarding through the webhook relay
//!
//! These tests verify that:
//! - Every failure of an alert is relayed once
//! - A failing relay never changes the client-facing response or the cache

use std::sync::Arc;
use std::time::Duration;

use alert_bridge::{
    config::WebhookConfig,
    forwarder::{Forwarder, WebhookForwarder},
};
use reqwest::StatusCode;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

/// Relaying happens after the response, so give it a moment to arrive.
async fn wait_for_requests(server: &MockServer, count: usize) {
    for _ in 0..200 {
        let received = server.received_requests().await.unwrap_or_default();
        if received.len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

fn webhook(url: String) -> Vec<Arc<dyn Forwarder>> {
    let forwarder = WebhookForwarder::new(&WebhookConfig {
        enabled: true,
        url,
        host: "bridge01".to_string(),
        timeout_secs: 5,
    })
    .unwrap();

    vec![Arc::new(forwarder)]
}

#[tokio::test]
async fn test_each_failure_is_relayed() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(body_partial_json(serde_json::json!({
            "host": "bridge01",
            "service": "Web-Homepage",
            "status": 2
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&mock_server)
        .await;

    let bridge = spawn_bridge("", webhook(format!("{}/hook", mock_server.uri())), None).await;

    let response = reqwest::Client::new()
        .post(bridge.url(ALERTS_PATH))
        .body(alert_json("Critical", "Homepage", &["Timeout", "DNS failure"]))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    wait_for_requests(&mock_server, 2).await;
    mock_server.verify().await;
}

#[tokio::test]
async fn test_failing_relay_does_not_affect_response() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&mock_server)
        .await;

    let bridge = spawn_bridge("", webhook(mock_server.uri()), None).await;

    let response = reqwest::Client::new()
        .post(bridge.url(ALERTS_PATH))
        .body(alert_json("Critical", "Homepage", &["Timeout", "DNS failure"]))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "");

    let record = bridge.cache.get("localhost", "Web-Homepage").await.unwrap();
    assert_eq!(record.output, "DNS failure");

    wait_for_requests(&mock_server, 2).await;
    mock_server.verify().await;
}

#[tokio::test]
async fn test_refused_client_is_never_relayed() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let bridge = spawn_bridge("10.9.9.9", webhook(mock_server.uri()), None).await;

    reqwest::Client::new()
        .post(bridge.url(ALERTS_PATH))
        .body(alert_json("Critical", "Homepage", &["Timeout"]))
        .send()
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    mock_server.verify().await;
}
