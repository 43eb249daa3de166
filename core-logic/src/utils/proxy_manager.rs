use crate::config::ProxyConfig;
use crate::error::ConfigError;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub struct ProxyManager;

impl ProxyManager {
    pub const PROXY_FILE: &'static str = "proxy.txt";

    /// Loads proxies from a newline-delimited file.
    ///
    /// Lines are taken as written (`scheme://[user:pass@]host:port`); blank lines
    /// and `#` comments are skipped. Scheme validation happens when a transport
    /// is built, so unsupported lines are kept and rejected there.
    pub fn load_proxies(path: impl AsRef<Path>) -> Result<Vec<ProxyConfig>, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("{} not found. Running without proxies.", path.display());
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            msg: e.to_string(),
        })?;

        let proxies: Vec<ProxyConfig> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(ProxyConfig::new)
            .collect();

        info!("Loaded {} proxies from {}", proxies.len(), path.display());
        Ok(proxies)
    }
}
