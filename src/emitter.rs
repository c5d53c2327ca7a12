//! Health-check snapshot rendering
//!
//! The document is a JSON array of
//! `{"check": {"host", "name", "status", "message", "timestamp", "statusFirstSeen"}}`
//! objects. `status` is the numeric severity code, the two timestamps are unix
//! seconds rendered as strings.
//!
//! Records are sorted by host, then service, and rendered one by one. A record
//! that fails to serialize is skipped with a warning; the rest of the document
//! is still emitted.

use serde::Serialize;
use tracing::warn;

use crate::{Severity, cache::CheckRecord};

#[derive(Debug, Serialize)]
struct SnapshotEntry<'a> {
    check: CheckView<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckView<'a> {
    host: &'a str,
    name: &'a str,
    status: Severity,
    message: &'a str,
    timestamp: String,
    status_first_seen: String,
}

impl<'a> From<&'a CheckRecord> for SnapshotEntry<'a> {
    fn from(record: &'a CheckRecord) -> Self {
        SnapshotEntry {
            check: CheckView {
                host: &record.host,
                name: &record.service,
                status: record.state,
                message: &record.output,
                timestamp: record.last_updated.to_string(),
                status_first_seen: record.status_first_seen.to_string(),
            },
        }
    }
}

pub fn render_snapshot(mut records: Vec<CheckRecord>) -> String {
    records.sort_by(|a, b| (&a.host, &a.service).cmp(&(&b.host, &b.service)));

    let rendered: Vec<String> = records
        .iter()
        .filter_map(|record| match serde_json::to_string(&SnapshotEntry::from(record)) {
            Ok(json) => Some(json),
            Err(e) => {
                warn!(
                    "skipping {}/{} in snapshot: {e}",
                    record.host, record.service
                );
                None
            }
        })
        .collect();

    format!("[{}]", rendered.join(","))
}
