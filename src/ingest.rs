//! Ingestion routing
//!
//! ```text
//! path → endpoint table → normalizer (by plugin kind) → for each failure:
//!                                                         cache upsert
//!                                         then, in the background:
//!                                         for each failure: forward (best-effort)
//! ```
//!
//! Normalization finishes before the cache is touched, so a payload that
//! fails to normalize leaves no trace. Every failure is written to the cache
//! before the request returns. Forwarding runs afterwards in a background
//! task; its failures are logged and never change the outcome of the request.

use std::sync::Arc;

use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::{
    Severity,
    cache::StateStore,
    config::EndpointConfig,
    forwarder::{Forwarder, PassiveCheck},
    normalizer::{NormalizationError, NormalizerRegistry},
};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("endpoint {path} uses unsupported plugin '{plugin}'")]
    UnsupportedPlugin { path: String, plugin: String },

    #[error("empty request body")]
    EmptyBody,

    #[error("failed to normalize payload on {path} ({plugin}): {source}")]
    Normalization {
        path: String,
        plugin: String,
        #[source]
        source: NormalizationError,
    },
}

/// What happened to a request that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// No endpoint is configured for the path; nothing was done.
    Unrouted,

    Applied {
        host: String,
        service: String,
        severity: Severity,
        /// Number of failure messages written to the cache
        count: usize,
    },
}

#[derive(Clone)]
pub struct IngestionRouter {
    endpoints: Arc<Vec<EndpointConfig>>,
    normalizers: NormalizerRegistry,
    cache: StateStore,
    forwarders: Arc<Vec<Arc<dyn Forwarder>>>,
}

impl IngestionRouter {
    pub fn new(
        endpoints: Vec<EndpointConfig>,
        normalizers: NormalizerRegistry,
        cache: StateStore,
        forwarders: Vec<Arc<dyn Forwarder>>,
    ) -> Self {
        Self {
            endpoints: Arc::new(endpoints),
            normalizers,
            cache,
            forwarders: Arc::new(forwarders),
        }
    }

    pub fn cache(&self) -> &StateStore {
        &self.cache
    }

    pub fn forwarding_enabled(&self) -> bool {
        !self.forwarders.is_empty()
    }

    pub fn endpoint(&self, path: &str) -> Option<&EndpointConfig> {
        self.endpoints.iter().find(|endpoint| endpoint.uri_path == path)
    }

    /// Routes a body received on `path` using `now` (unix seconds) as the
    /// timestamp for every resulting cache write.
    #[instrument(skip(self, body), fields(len = body.len()))]
    pub async fn ingest(
        &self,
        path: &str,
        body: &[u8],
        now: i64,
    ) -> Result<IngestOutcome, IngestError> {
        let Some(endpoint) = self.endpoint(path) else {
            warn!("no endpoint configured for {path}, ignoring request");
            return Ok(IngestOutcome::Unrouted);
        };

        let Some(normalizer) = self.normalizers.get(&endpoint.plugin_name) else {
            return Err(IngestError::UnsupportedPlugin {
                path: path.to_string(),
                plugin: endpoint.plugin_name.clone(),
            });
        };

        if body.is_empty() {
            return Err(IngestError::EmptyBody);
        }

        let alert = normalizer
            .normalize(body)
            .map_err(|source| IngestError::Normalization {
                path: path.to_string(),
                plugin: endpoint.plugin_name.clone(),
                source,
            })?;

        debug!(
            "normalized alert: service={} severity={} failures={:?}",
            alert.service, alert.severity, alert.failures
        );

        for failure in &alert.failures {
            self.cache
                .upsert(&endpoint.host, &alert.service, alert.severity, failure, now)
                .await;
        }

        info!(
            "wrote {} item(s) to the cache for {}/{}",
            alert.failures.len(),
            endpoint.host,
            alert.service
        );

        if self.forwarding_enabled() {
            let checks = alert
                .failures
                .iter()
                .map(|failure| PassiveCheck {
                    severity: alert.severity,
                    service: alert.service.clone(),
                    message: failure.clone(),
                })
                .collect();
            tokio::spawn(forward_all(self.forwarders.clone(), checks));
        }

        Ok(IngestOutcome::Applied {
            host: endpoint.host.clone(),
            service: alert.service,
            severity: alert.severity,
            count: alert.failures.len(),
        })
    }
}

/// Relays checks in order. Forwarders run side by side for each check.
async fn forward_all(forwarders: Arc<Vec<Arc<dyn Forwarder>>>, checks: Vec<PassiveCheck>) {
    for check in &checks {
        let results = join_all(forwarders.iter().map(|forwarder| forwarder.forward(check))).await;

        for (forwarder, result) in forwarders.iter().zip(results) {
            if let Err(e) = result {
                warn!(
                    "{} forwarding failed for {}: {e}",
                    forwarder.name(),
                    check.service
                );
            }
        }
    }
}
