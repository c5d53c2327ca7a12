//! Catchpoint alert pushes
//!
//! Expects the JSON alert template:
//!
//! ```json
//! {
//!   "ProductName": "Web",
//!   "TestName": "Homepage",
//!   "Level": "Critical",
//!   "Failures": [{ "Node": "New York", "Message": "Timeout" }]
//! }
//! ```
//!
//! The service is `"<product>-<test>"`. Levels map case-insensitively:
//! `ok`/`improved` to OK, `warning`, `critical`, anything else to UNKNOWN.

use serde::Deserialize;

use crate::Severity;

use super::{AlertNormalizer, NormalizationError, NormalizedAlert};

pub const PLUGIN_NAME: &str = "catchpoint_alerts";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AlertPayload {
    #[serde(default)]
    product_name: String,
    #[serde(default)]
    test_name: String,
    #[serde(default)]
    level: String,
    #[serde(default)]
    failures: Vec<Failure>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Failure {
    node: Option<String>,
    message: String,
}

impl Failure {
    fn render(&self) -> String {
        match self.node.as_deref() {
            Some(node) if !node.is_empty() => format!("{node}: {}", self.message),
            _ => self.message.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CatchpointAlerts;

impl CatchpointAlerts {
    fn severity(level: &str) -> Severity {
        match level.trim().to_ascii_lowercase().as_str() {
            "ok" | "improved" => Severity::Ok,
            "warning" => Severity::Warning,
            "critical" => Severity::Critical,
            _ => Severity::Unknown,
        }
    }
}

impl AlertNormalizer for CatchpointAlerts {
    fn normalize(&self, body: &[u8]) -> Result<NormalizedAlert, NormalizationError> {
        let payload: AlertPayload = serde_json::from_slice(body)?;

        if payload.product_name.is_empty() {
            return Err(NormalizationError::MissingField("ProductName"));
        }
        if payload.test_name.is_empty() {
            return Err(NormalizationError::MissingField("TestName"));
        }

        let severity = Self::severity(&payload.level);
        let service = format!("{}-{}", payload.product_name, payload.test_name);

        let mut failures: Vec<String> = payload.failures.iter().map(Failure::render).collect();
        if failures.is_empty() {
            // recoveries carry no failures but still have to reach the cache
            failures.push(format!("{service}: {}", payload.level));
        }

        Ok(NormalizedAlert {
            severity,
            service,
            failures,
        })
    }
}
