use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, bail};
use tracing::{trace, warn};

use crate::normalizer::NormalizerRegistry;

pub const DEFAULT_CONFIG_PATH: &str = "./receiver.cfg.json";

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// Address the HTTP listener binds to
    #[serde(default = "default_listener_ip")]
    pub listener_ip: IpAddr,

    #[serde(default = "default_listener_port")]
    pub listener_port: u16,

    /// Comma-separated list of client addresses allowed to talk to the bridge.
    /// Empty serves everybody.
    #[serde(default)]
    pub authorized_ips: String,

    /// Number of runtime worker threads
    #[serde(default = "default_max_procs")]
    pub max_procs: usize,

    /// Log file to append to. Empty logs to stderr.
    #[serde(default)]
    pub log_file: String,

    /// Which normalizer handles which path
    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,

    /// Paths serving the cache snapshot
    #[serde(default)]
    pub emitter: Vec<EmitterConfig>,

    #[serde(default)]
    pub nsca: NscaConfig,

    #[serde(default)]
    pub webhook: WebhookConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct EndpointConfig {
    /// e.g. "/catchpoint/alerts"
    pub uri_path: String,

    /// Currently supported: "catchpoint_alerts"
    pub plugin_name: String,

    /// Host key under which results from this endpoint are cached
    #[serde(default = "default_endpoint_host")]
    pub host: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct EmitterConfig {
    pub uri_path: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct NscaConfig {
    #[serde(default)]
    pub enabled: bool,

    /// NSCA daemon to send results to
    #[serde(default)]
    pub server: String,

    #[serde(default = "default_nsca_command", rename = "os_command_path")]
    pub command: String,

    #[serde(default = "default_nsca_config_file")]
    pub config_file: String,

    /// Host name reported with every passive check
    #[serde(default = "default_client_host")]
    pub client_host: String,

    #[serde(default = "default_forward_timeout")]
    pub timeout_secs: u64,
}

impl NscaConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for NscaConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            server: String::new(),
            command: default_nsca_command(),
            config_file: default_nsca_config_file(),
            client_host: default_client_host(),
            timeout_secs: default_forward_timeout(),
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct WebhookConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub url: String,

    /// Host name reported with every relayed check
    #[serde(default = "default_client_host")]
    pub host: String,

    #[serde(default = "default_forward_timeout")]
    pub timeout_secs: u64,
}

impl WebhookConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: String::new(),
            host: default_client_host(),
            timeout_secs: default_forward_timeout(),
        }
    }
}

fn default_listener_ip() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_listener_port() -> u16 {
    crate::util::get_default_port()
}

fn default_max_procs() -> usize {
    1
}

fn default_endpoint_host() -> String {
    String::from("localhost")
}

fn default_nsca_command() -> String {
    String::from("/usr/sbin/send_nsca")
}

fn default_nsca_config_file() -> String {
    String::from("/etc/send_nsca.cfg")
}

fn default_client_host() -> String {
    sysinfo::System::host_name().unwrap_or_else(|| String::from("localhost"))
}

fn default_forward_timeout() -> u64 {
    10
}

impl Config {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listener_ip, self.listener_port)
    }

    pub fn worker_threads(&self) -> usize {
        self.max_procs.max(1)
    }

    /// Rejects settings the bridge cannot run with.
    ///
    /// Unknown plugin kinds only produce a warning: requests to those
    /// endpoints fail individually at routing time.
    pub fn validate(&self, registry: &NormalizerRegistry) -> anyhow::Result<()> {
        if self.nsca.enabled && self.nsca.server.is_empty() {
            bail!("nsca forwarding is enabled but no server is configured");
        }

        if self.webhook.enabled && self.webhook.url.is_empty() {
            bail!("webhook forwarding is enabled but no url is configured");
        }

        for endpoint in &self.endpoints {
            if !endpoint.uri_path.starts_with('/') {
                bail!("endpoint path '{}' must start with '/'", endpoint.uri_path);
            }
            if !registry.supports(&endpoint.plugin_name) {
                warn!(
                    "endpoint {} uses unsupported plugin '{}'",
                    endpoint.uri_path, endpoint.plugin_name
                );
            }
        }

        for emitter in &self.emitter {
            if !emitter.uri_path.starts_with('/') {
                bail!("emitter path '{}' must start with '/'", emitter.uri_path);
            }
        }

        Ok(())
    }
}

pub fn read_config_file(path: impl AsRef<Path>) -> anyhow::Result<Config> {
    let path = path.as_ref();
    let file_content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    serde_json::from_str(&file_content)
        .with_context(|| format!("invalid configuration file: {}", path.display()))
        .inspect(|config| trace!("loaded config: {config:?}"))
}
