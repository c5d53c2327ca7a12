use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::config::DEFAULT_CONFIG_PATH;

const DEFAULT_PORT: u16 = 8080;

pub fn get_default_port() -> u16 {
    DEFAULT_PORT
}

const BRIDGE_CONFIG: &str = "BRIDGE_CONFIG";

/// Config file named by `BRIDGE_CONFIG`, or the default path.
pub fn get_config_path() -> PathBuf {
    config_path_or_default(std::env::var(BRIDGE_CONFIG).ok())
}

fn config_path_or_default(from_env: Option<String>) -> PathBuf {
    from_env
        .filter(|path| !path.trim().is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Current wall-clock time as unix seconds.
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Writes a request body to `<dir>/<unix_nanos>_<pid>.txt`.
///
/// Dumping is a debugging aid, so failures are logged and swallowed.
pub async fn dump_request(dir: &Path, body: &[u8]) -> Option<PathBuf> {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let path = dir.join(format!("{nanos}_{}.txt", std::process::id()));

    match tokio::fs::write(&path, body).await {
        Ok(()) => {
            debug!("dumped request body to {}", path.display());
            Some(path)
        }
        Err(e) => {
            error!("failed to dump request body to {}: {e}", path.display());
            None
        }
    }
}
