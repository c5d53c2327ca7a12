//! End-to-end ingestion and snapshot tests
//!
//! These tests verify that:
//! - Alerts pushed over HTTP land in the cache
//! - The snapshot endpoint serves the cache as health-check JSON
//! - First-seen tracking survives repeated pushes
//! - Refused clients and unknown paths leave no trace

use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use serde_json::Value;

use crate::helpers::*;

#[tokio::test]
async fn test_empty_bridge_serves_empty_array() {
    let bridge = spawn_bridge("", vec![], None).await;

    let response = reqwest::get(bridge.url(STATUS_PATH)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );
    assert_eq!(response.text().await.unwrap(), "[]");
}

#[tokio::test]
async fn test_pushed_alert_shows_up_in_snapshot() {
    let bridge = spawn_bridge("", vec![], None).await;
    let client = reqwest::Client::new();

    let response = client
        .post(bridge.url(ALERTS_PATH))
        .body(alert_json("Critical", "Homepage", &["Timeout"]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "");

    let snapshot: Value = client
        .get(bridge.url(STATUS_PATH))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let checks = snapshot.as_array().unwrap();
    assert_eq!(checks.len(), 1);
    let check = &checks[0]["check"];
    assert_eq!(check["host"], "localhost");
    assert_eq!(check["name"], "Web-Homepage");
    assert_eq!(check["status"], 2);
    assert_eq!(check["message"], "Timeout");
    assert!(check["timestamp"].is_string());
    assert!(check["statusFirstSeen"].is_string());
}

#[tokio::test]
async fn test_repeated_state_keeps_first_seen() {
    let bridge = spawn_bridge("", vec![], None).await;
    let client = reqwest::Client::new();

    client
        .post(bridge.url(ALERTS_PATH))
        .body(alert_json("Critical", "Homepage", &["Timeout"]))
        .send()
        .await
        .unwrap();
    let first = bridge.cache.get("localhost", "Web-Homepage").await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

    client
        .post(bridge.url(ALERTS_PATH))
        .body(alert_json("Critical", "Homepage", &["Timeout again"]))
        .send()
        .await
        .unwrap();
    let second = bridge.cache.get("localhost", "Web-Homepage").await.unwrap();

    assert_eq!(second.output, "Timeout again");
    assert_eq!(second.status_first_seen, first.status_first_seen);
    assert!(second.last_updated > first.last_updated);
}

#[tokio::test]
async fn test_recovery_resets_first_seen() {
    let bridge = spawn_bridge("", vec![], None).await;
    let client = reqwest::Client::new();

    client
        .post(bridge.url(ALERTS_PATH))
        .body(alert_json("Critical", "Homepage", &["Timeout"]))
        .send()
        .await
        .unwrap();
    let down = bridge.cache.get("localhost", "Web-Homepage").await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

    client
        .post(bridge.url(ALERTS_PATH))
        .body(alert_json("Improved", "Homepage", &[]))
        .send()
        .await
        .unwrap();
    let up = bridge.cache.get("localhost", "Web-Homepage").await.unwrap();

    assert_eq!(up.output, "Web-Homepage: Improved");
    assert!(up.status_first_seen > down.status_first_seen);
    assert_eq!(up.status_first_seen, up.last_updated);
}

#[tokio::test]
async fn test_refused_client_changes_nothing() {
    let bridge = spawn_bridge("10.9.9.9", vec![], None).await;
    let client = reqwest::Client::new();

    let response = client
        .post(bridge.url(ALERTS_PATH))
        .body(alert_json("Critical", "Homepage", &["Timeout"]))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "");
    assert!(bridge.cache.is_empty().await);
}

#[tokio::test]
async fn test_listed_client_is_served() {
    let bridge = spawn_bridge("10.9.9.9,127.0.0.1", vec![], None).await;

    let response = reqwest::Client::new()
        .post(bridge.url(ALERTS_PATH))
        .body(alert_json("Warning", "Homepage", &["Slow"]))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(bridge.cache.len().await, 1);
}

#[tokio::test]
async fn test_unconfigured_path_changes_nothing() {
    let bridge = spawn_bridge("", vec![], None).await;

    let response = reqwest::Client::new()
        .post(bridge.url("/pingdom/alerts"))
        .body(alert_json("Critical", "Homepage", &["Timeout"]))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(bridge.cache.is_empty().await);
}

#[tokio::test]
async fn test_error_statuses() {
    let bridge = spawn_bridge("", vec![], None).await;
    let client = reqwest::Client::new();

    let empty = client.post(bridge.url(ALERTS_PATH)).send().await.unwrap();
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

    let garbage = client
        .post(bridge.url(ALERTS_PATH))
        .body("<Alert/>")
        .send()
        .await
        .unwrap();
    assert_eq!(garbage.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let wrong_method = client
        .post(bridge.url(STATUS_PATH))
        .body("{}")
        .send()
        .await
        .unwrap();
    assert_eq!(wrong_method.status(), StatusCode::BAD_REQUEST);

    assert!(bridge.cache.is_empty().await);
}

#[tokio::test]
async fn test_request_bodies_are_dumped() {
    let dir = tempfile::tempdir().unwrap();
    let bridge = spawn_bridge("", vec![], Some(dir.path().to_path_buf())).await;
    let body = alert_json("Critical", "Homepage", &["Timeout"]);

    reqwest::Client::new()
        .post(bridge.url(ALERTS_PATH))
        .body(body.clone())
        .send()
        .await
        .unwrap();

    let dumps: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(dumps.len(), 1);
    assert_eq!(std::fs::read_to_string(&dumps[0]).unwrap(), body);
}
