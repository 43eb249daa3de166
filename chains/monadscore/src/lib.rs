//! # MonadScore client
//!
//! Daily reward-claiming workflow for a list of wallet identities against the
//! MonadScore service.
//!
//! - [`config`] - TOML settings with defaults
//! - [`transport`] - per-request headers, timeout and proxy tunnel
//! - [`client`] - HTTP backend seam and the retrying request executor
//! - [`signer`] - ethers-backed challenge signer
//! - [`pipeline`] - the per-identity workflow
//! - [`scheduler`] - daily cycles over all identities

pub mod client;
pub mod config;
pub mod pipeline;
pub mod scheduler;
pub mod signer;
pub mod transport;
