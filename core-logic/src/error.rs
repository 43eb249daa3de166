//! # Core Error Types
//!
//! Centralized error definitions for the core-logic crate.
//! All errors implement `std::error::Error` and `std::fmt::Display`.

use serde_json::Value;
use thiserror::Error;

/// Unified error type for core-logic operations.
///
/// This enum wraps all specific error types and provides a unified
/// error interface for the application layer.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Config(ConfigError),

    #[error(transparent)]
    Wallet(WalletError),

    #[error(transparent)]
    Network(NetworkError),

    #[error(transparent)]
    Proxy(ProxyError),
}

impl From<ConfigError> for CoreError {
    fn from(e: ConfigError) -> Self {
        CoreError::Config(e)
    }
}

impl From<WalletError> for CoreError {
    fn from(e: WalletError) -> Self {
        CoreError::Wallet(e)
    }
}

impl From<NetworkError> for CoreError {
    fn from(e: NetworkError) -> Self {
        CoreError::Network(e)
    }
}

impl From<ProxyError> for CoreError {
    fn from(e: ProxyError) -> Self {
        CoreError::Proxy(e)
    }
}

/// Configuration-related errors
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("Invalid URL for '{field}': '{url}'")]
    InvalidUrl { field: String, url: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("I/O error reading {path}: {msg}")]
    IoError { path: String, msg: String },

    #[error("Malformed content in {path}: {msg}")]
    Malformed { path: String, msg: String },
}

/// Wallet and signing errors
#[derive(Error, Debug, Clone)]
pub enum WalletError {
    #[error("No identities available in {path}")]
    EmptyIdentityList { path: String },

    #[error("Invalid private key format for {address}: {reason}")]
    InvalidKeyFormat { address: String, reason: String },

    #[error("Signing failed for {address}: {reason}")]
    SigningFailed { address: String, reason: String },
}

/// Network and HTTP-related errors
#[derive(Error, Debug, Clone)]
pub enum NetworkError {
    #[error("Unsupported request method: {method}")]
    UnsupportedMethod { method: String },

    #[error("Request timeout after {timeout_ms}ms to {endpoint}")]
    Timeout { timeout_ms: u64, endpoint: String },

    #[error("Transport failure to {endpoint}: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("HTTP error {status_code} from {endpoint}")]
    HttpError {
        status_code: u16,
        endpoint: String,
        body: Option<Value>,
    },

    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },
}

impl NetworkError {
    /// Decoded response body, only present for non-2xx responses.
    pub fn body(&self) -> Option<&Value> {
        match self {
            NetworkError::HttpError { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// The `message` field of an error response body, if the server sent one.
    pub fn server_message(&self) -> Option<&str> {
        self.body()
            .and_then(|b| b.get("message"))
            .and_then(Value::as_str)
    }

    pub fn is_retryable(&self) -> bool {
        !matches!(self, NetworkError::UnsupportedMethod { .. })
    }
}

/// Proxy specification errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProxyError {
    #[error("Unsupported proxy type: {spec}")]
    UnsupportedScheme { spec: String },

    #[error("Invalid proxy '{spec}': {reason}")]
    Invalid { spec: String, reason: String },
}
