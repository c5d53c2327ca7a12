//! Vendor payload normalization
//!
//! A normalizer turns a raw alert push into a severity, a service name and
//! the list of failure messages to record. Each endpoint names the plugin
//! kind that handles it; the registry maps kinds to normalizers.

pub mod catchpoint;

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::Severity;

pub use catchpoint::CatchpointAlerts;

/// Result of normalizing one alert push
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedAlert {
    pub severity: Severity,
    pub service: String,

    /// One entry per failure, in payload order. Never empty.
    pub failures: Vec<String>,
}

#[derive(Debug, Error)]
pub enum NormalizationError {
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("missing field: {0}")]
    MissingField(&'static str),
}

pub trait AlertNormalizer: Send + Sync {
    fn normalize(&self, body: &[u8]) -> Result<NormalizedAlert, NormalizationError>;
}

/// Plugin kind to normalizer table
#[derive(Clone, Default)]
pub struct NormalizerRegistry {
    normalizers: HashMap<String, Arc<dyn AlertNormalizer>>,
}

impl NormalizerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in plugin kind
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(catchpoint::PLUGIN_NAME, Arc::new(CatchpointAlerts));
        registry
    }

    pub fn register(&mut self, kind: impl Into<String>, normalizer: Arc<dyn AlertNormalizer>) {
        self.normalizers.insert(kind.into(), normalizer);
    }

    pub fn get(&self, kind: &str) -> Option<Arc<dyn AlertNormalizer>> {
        self.normalizers.get(kind).cloned()
    }

    pub fn supports(&self, kind: &str) -> bool {
        self.normalizers.contains_key(kind)
    }
}

impl std::fmt::Debug for NormalizerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.normalizers.keys()).finish()
    }
}
