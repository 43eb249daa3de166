//! # Core Logic - Shared Utilities for Reward Service Clients
//!
//! This crate provides the service-agnostic plumbing used by the client crates
//! under `chains/`: identity and proxy loading, retry with backoff, logging and
//! the error types shared across the workspace.
//!
//! ## Modules
//!
//! - [`config`] - Proxy specification model and scheme classification
//! - [`error`] - Typed error handling with thiserror
//! - [`traits`] - Core trait definitions (message signing, task results)
//! - [`utils`] - Utility modules (wallet, proxy, retry, logger)

pub mod config;
pub mod error;
pub mod traits;
pub(crate) mod utils;

pub use config::{ProxyConfig, ProxyScheme, TunnelKind};
pub use error::{ConfigError, CoreError, NetworkError, ProxyError, WalletError};
pub use traits::{MessageSigner, TaskResult};

// Utils are pub(crate) - only export specific public utilities
pub use utils::{setup_logger, Identity, ProxyManager, WalletManager};

pub use utils::retry::{with_retry, RetryConfig};
