//! In-process check state shared by ingestion and the snapshot emitter
//!
//! The store is a two-level map `host -> service -> CheckRecord` behind a
//! single `RwLock`. Every write replaces a whole record while holding the
//! write lock, so readers never observe a record mid-update.
//!
//! ## Limitations
//!
//! - **Volatile**: everything is lost on restart
//! - **No eviction**: a pair stays until restart once seen, so upstream
//!   renaming services grows the map without bound

pub mod record;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::trace;

use crate::Severity;

pub use record::CheckRecord;

type HostMap = HashMap<String, HashMap<String, CheckRecord>>;

/// Shared handle to the check cache. Clones point at the same map.
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    hosts: Arc<RwLock<HostMap>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a result for `host`/`service`.
    ///
    /// Returns once the write is visible to readers.
    pub async fn upsert(
        &self,
        host: &str,
        service: &str,
        state: Severity,
        output: &str,
        timestamp: i64,
    ) {
        let mut hosts = self.hosts.write().await;
        let services = hosts.entry(host.to_string()).or_default();

        let record = CheckRecord::next(
            services.get(service),
            host,
            service,
            state,
            output,
            timestamp,
        );
        trace!(
            "{host}/{service}: state={state} first_seen={}",
            record.status_first_seen
        );
        services.insert(service.to_string(), record);
    }

    /// Copies out every record. No ordering is guaranteed.
    pub async fn snapshot_all(&self) -> Vec<CheckRecord> {
        let hosts = self.hosts.read().await;
        hosts
            .values()
            .flat_map(|services| services.values().cloned())
            .collect()
    }

    pub async fn get(&self, host: &str, service: &str) -> Option<CheckRecord> {
        let hosts = self.hosts.read().await;
        hosts.get(host).and_then(|services| services.get(service)).cloned()
    }

    /// Number of cached (host, service) pairs
    pub async fn len(&self) -> usize {
        let hosts = self.hosts.read().await;
        hosts.values().map(HashMap::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
