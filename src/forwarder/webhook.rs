//! JSON webhook relay

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, instrument};

use crate::config::WebhookConfig;

use super::{ForwardError, Forwarder, PassiveCheck};

#[derive(Debug, Clone)]
pub struct WebhookForwarder {
    client: Client,
    url: String,
    host: String,
}

impl WebhookForwarder {
    pub fn new(config: &WebhookConfig) -> Result<Self, ForwardError> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            host: config.host.clone(),
        })
    }
}

#[async_trait]
impl Forwarder for WebhookForwarder {
    fn name(&self) -> &'static str {
        "webhook"
    }

    #[instrument(skip(self, check), fields(service = %check.service))]
    async fn forward(&self, check: &PassiveCheck) -> Result<(), ForwardError> {
        let payload = json!({
            "host": self.host,
            "service": check.service,
            "status": check.severity.code(),
            "message": check.message,
            "timestamp": Utc::now().to_rfc3339()
        });

        let response = self.client.post(&self.url).json(&payload).send().await?;
        if !response.status().is_success() {
            return Err(ForwardError::Status(response.status()));
        }

        debug!("relayed check to {}", self.url);
        Ok(())
    }
}
