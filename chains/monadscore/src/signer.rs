use async_trait::async_trait;
use core_logic::{MessageSigner, WalletError};
use ethers::signers::{LocalWallet, Signer};

/// EIP-191 personal-message signer backed by an ethers [`LocalWallet`].
#[derive(Debug, Default, Clone, Copy)]
pub struct EthersSigner;

#[async_trait]
impl MessageSigner for EthersSigner {
    async fn sign_message(
        &self,
        message: &str,
        address: &str,
        private_key: &str,
    ) -> Result<String, WalletError> {
        let wallet = private_key
            .trim()
            .parse::<LocalWallet>()
            .map_err(|e| WalletError::InvalidKeyFormat {
                address: address.to_string(),
                reason: e.to_string(),
            })?;

        let signature = wallet
            .sign_message(message)
            .await
            .map_err(|e| WalletError::SigningFailed {
                address: address.to_string(),
                reason: e.to_string(),
            })?;

        Ok(format!("0x{}", signature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known development key (anvil/hardhat account #0)
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[tokio::test]
    async fn test_signature_is_deterministic() {
        let signer = EthersSigner;
        let a = signer.sign_message("hello", "0xf39f", DEV_KEY).await.unwrap();
        let b = signer.sign_message("hello", "0xf39f", DEV_KEY).await.unwrap();

        assert_eq!(a, b);
        assert!(a.starts_with("0x"));
        // 65 bytes hex-encoded
        assert_eq!(a.len(), 2 + 130);
    }

    #[tokio::test]
    async fn test_invalid_key_is_rejected() {
        let result = EthersSigner.sign_message("hello", "0xabc", "not-a-key").await;
        assert!(matches!(result, Err(WalletError::InvalidKeyFormat { .. })));
    }
}
