use crate::error::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::info;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// One wallet identity: an address plus the private key that controls it.
#[derive(Clone, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(rename = "walletAddress")]
    pub address: String,
    pub private_key: String,
}

impl Identity {
    pub fn new(address: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            private_key: private_key.into(),
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("address", &self.address)
            .field("private_key", &"***REDACTED***")
            .finish()
    }
}

pub struct WalletManager;

impl WalletManager {
    pub const ACCOUNTS_FILE: &'static str = "accounts.json";

    /// Reads the identity store: a JSON array of `{ walletAddress, privateKey }`.
    pub fn load_identities(path: impl AsRef<Path>) -> Result<Vec<Identity>, ConfigError> {
        let path = path.as_ref();
        let path_display = path.display().to_string();

        if !path.exists() {
            return Err(ConfigError::FileNotFound { path: path_display });
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path_display.clone(),
            msg: e.to_string(),
        })?;

        let identities: Vec<Identity> =
            serde_json::from_str(&content).map_err(|e| ConfigError::Malformed {
                path: path_display.clone(),
                msg: e.to_string(),
            })?;

        info!("Loaded {} identities from {}", identities.len(), path_display);
        Ok(identities)
    }
}
