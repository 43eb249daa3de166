use crate::error::WalletError;
use async_trait::async_trait;

/// Outcome of one step run on behalf of an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResult {
    pub success: bool,
    pub message: String,
}

impl TaskResult {
    pub fn new(success: bool, message: impl Into<String>) -> Self {
        Self {
            success,
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait MessageSigner: Send + Sync {
    /// Signs `message` with the given private key material and returns the
    /// encoded signature. Key handling and signature format are up to the implementor.
    async fn sign_message(
        &self,
        message: &str,
        address: &str,
        private_key: &str,
    ) -> Result<String, WalletError>;
}
