//! Source-address allow-list
//!
//! Entries are compared as exact strings against the client address with its
//! port stripped. There is no CIDR or wildcard support.

use std::net::SocketAddr;

use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct AccessFilter {
    allowed: Vec<String>,
}

impl AccessFilter {
    /// Builds a filter from a comma-delimited list. An empty list admits everybody.
    pub fn from_list(list: &str) -> Self {
        let allowed = list
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(String::from)
            .collect();

        Self { allowed }
    }

    pub fn is_open(&self) -> bool {
        self.allowed.is_empty()
    }

    /// Decides whether a client (given as `ip`, `ip:port` or `[v6]:port`) may proceed.
    pub fn admits(&self, remote: &str) -> bool {
        if self.is_open() {
            return true;
        }

        let address = strip_port(remote);
        if self.allowed.iter().any(|entry| entry == address) {
            info!("accepted client {address}");
            true
        } else {
            info!("refused client {remote}");
            false
        }
    }

    pub fn admits_socket(&self, remote: &SocketAddr) -> bool {
        self.admits(&remote.to_string())
    }
}

fn strip_port(remote: &str) -> &str {
    if let Ok(addr) = remote.parse::<SocketAddr>() {
        // bracketed v6 or v4 with port: slice the host part back out of the input
        let host_end = if addr.is_ipv6() {
            remote.rfind("]:").unwrap_or(remote.len())
        } else {
            remote.rfind(':').unwrap_or(remote.len())
        };
        return remote[..host_end].trim_start_matches('[');
    }

    // bare v6 addresses carry colons but no port
    if remote.matches(':').count() > 1 {
        return remote.trim_start_matches('[').trim_end_matches(']');
    }

    remote.split(':').next().unwrap_or(remote)
}
