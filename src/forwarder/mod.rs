//! Passive-check relays to the legacy monitoring system
//!
//! Forwarding is best-effort: callers log failures and move on. Every
//! forwarder owns its own timeout so a hanging relay cannot stall ingestion
//! forever.

pub mod nsca;
pub mod webhook;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::{Severity, config::Config};

pub use nsca::NscaForwarder;
pub use webhook::WebhookForwarder;

/// One result to relay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassiveCheck {
    pub severity: Severity,
    pub service: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} exited with {status}: {stderr}")]
    Exit {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook answered with status {0}")]
    Status(reqwest::StatusCode),
}

#[async_trait]
pub trait Forwarder: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    async fn forward(&self, check: &PassiveCheck) -> Result<(), ForwardError>;
}

/// Builds every forwarder enabled in `config`, in configuration order.
///
/// An empty list means forwarding is disabled.
pub fn from_config(config: &Config) -> Result<Vec<Arc<dyn Forwarder>>, ForwardError> {
    let mut forwarders: Vec<Arc<dyn Forwarder>> = vec![];

    if config.nsca.enabled {
        forwarders.push(Arc::new(NscaForwarder::new(&config.nsca)));
    }

    if config.webhook.enabled {
        forwarders.push(Arc::new(WebhookForwarder::new(&config.webhook)?));
    }

    Ok(forwarders)
}
