//! Concurrency tests
//!
//! These tests verify that:
//! - Concurrent writers to distinct pairs all land
//! - Snapshot readers racing writers never see a torn record

use alert_bridge::{Severity, cache::StateStore};
use futures::future::join_all;
use serde_json::Value;

use crate::helpers::*;

const WRITERS: usize = 8;
const WRITES_PER_WRITER: i64 = 200;

fn severity_for(t: i64) -> Severity {
    if (t / 10) % 2 == 0 { Severity::Ok } else { Severity::Critical }
}

async fn write_sequence(cache: StateStore, service: String) {
    for t in 1..=WRITES_PER_WRITER {
        cache
            .upsert("localhost", &service, severity_for(t), &format!("{service}@{t}"), t)
            .await;
        tokio::task::yield_now().await;
    }
}

/// Every field of a record must come from the same write.
fn assert_consistent(check: &Value) {
    let name = check["name"].as_str().unwrap();
    let t: i64 = check["timestamp"].as_str().unwrap().parse().unwrap();
    let first_seen: i64 = check["statusFirstSeen"].as_str().unwrap().parse().unwrap();

    assert_eq!(check["message"].as_str().unwrap(), format!("{name}@{t}"));
    assert_eq!(check["status"].as_u64().unwrap(), severity_for(t).code() as u64);
    // state flips every ten writes, so first-seen is the start of t's block
    let block_start = if t < 10 { 1 } else { t - t % 10 };
    assert_eq!(first_seen, block_start);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writers_and_snapshot_readers() {
    let bridge = spawn_bridge("", vec![], None).await;

    let writers: Vec<_> = (0..WRITERS)
        .map(|i| tokio::spawn(write_sequence(bridge.cache.clone(), format!("svc-{i}"))))
        .collect();

    let client = reqwest::Client::new();
    let mut snapshots = 0;
    loop {
        let done = writers.iter().all(|w| w.is_finished());
        let snapshot: Value = client
            .get(bridge.url(STATUS_PATH))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        for entry in snapshot.as_array().unwrap() {
            assert_consistent(&entry["check"]);
        }
        snapshots += 1;

        if done {
            break;
        }
    }

    for result in join_all(writers).await {
        result.unwrap();
    }

    assert!(snapshots > 0);
    assert_eq!(bridge.cache.len().await, WRITERS);
    for record in bridge.cache.snapshot_all().await {
        assert_eq!(record.last_updated, WRITES_PER_WRITER);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_alert_pushes_all_land() {
    let bridge = spawn_bridge("", vec![], None).await;
    let client = reqwest::Client::new();

    let pushes = (0..20).map(|i| {
        let client = client.clone();
        let url = bridge.url(ALERTS_PATH);
        async move {
            client
                .post(url)
                .body(alert_json("Warning", &format!("Test{i}"), &["Slow"]))
                .send()
                .await
                .unwrap()
                .status()
        }
    });

    for status in join_all(pushes).await {
        assert!(status.is_success());
    }

    assert_eq!(bridge.cache.len().await, 20);
}
