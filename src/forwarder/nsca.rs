//! NSCA relay through the `send_nsca` command line tool
//!
//! Each check is written to the tool's stdin as one service-check line:
//! `<client_host>\t<service>\t<code>\t<message>\n`.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::config::NscaConfig;

use super::{ForwardError, Forwarder, PassiveCheck};

#[derive(Debug, Clone)]
pub struct NscaForwarder {
    command: String,
    server: String,
    config_file: String,
    client_host: String,
    timeout: Duration,
}

impl NscaForwarder {
    pub fn new(config: &NscaConfig) -> Self {
        Self {
            command: config.command.clone(),
            server: config.server.clone(),
            config_file: config.config_file.clone(),
            client_host: config.client_host.clone(),
            timeout: config.timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn line(&self, check: &PassiveCheck) -> String {
        // tabs and newlines would split the record on the NSCA side
        let message = check.message.replace(['\t', '\n', '\r'], " ");
        format!(
            "{}\t{}\t{}\t{}\n",
            self.client_host,
            check.service,
            check.severity.code(),
            message
        )
    }

    async fn run(&self, line: String) -> Result<(), ForwardError> {
        let mut child = Command::new(&self.command)
            .args(["-H", &self.server, "-c", &self.config_file])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ForwardError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(line.as_bytes()).await?;
            // dropping stdin closes it so send_nsca sees EOF
        }

        let output = child.wait_with_output().await?;
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        debug!(
            "{} stdout: {}",
            self.command,
            String::from_utf8_lossy(&output.stdout).trim()
        );
        debug!("{} stderr: {stderr}", self.command);

        if !output.status.success() {
            return Err(ForwardError::Exit {
                command: self.command.clone(),
                status: output.status,
                stderr,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Forwarder for NscaForwarder {
    fn name(&self) -> &'static str {
        "nsca"
    }

    #[instrument(skip(self, check), fields(service = %check.service))]
    async fn forward(&self, check: &PassiveCheck) -> Result<(), ForwardError> {
        let line = self.line(check);
        tokio::time::timeout(self.timeout, self.run(line))
            .await
            .map_err(|_| ForwardError::Timeout(self.timeout))?
    }
}
