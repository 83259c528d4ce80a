//! Local transaction signing

use alloy::consensus::TxEnvelope;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy_primitives::{Address, B256};

use crate::error::{Result, ScannerError};

/// Signs transaction requests with a single local key
#[derive(Clone)]
pub struct TxSigner {
    address: Address,
    wallet: EthereumWallet,
}

impl std::fmt::Debug for TxSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxSigner").field("address", &self.address).finish_non_exhaustive()
    }
}

impl TxSigner {
    /// Create a signer from a hex private key, with or without the `0x` prefix
    pub fn from_private_key(private_key: &str) -> Result<Self> {
        let signer: PrivateKeySigner = private_key
            .trim()
            .parse()
            .map_err(|e| ScannerError::Configuration(format!("Invalid private key: {}", e)))?;

        let address = signer.address();
        Ok(Self {
            address,
            wallet: EthereumWallet::from(signer),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a complete request (nonce, gas, fees and chain id already set)
    pub async fn sign(&self, request: TransactionRequest) -> Result<SignedTransaction> {
        let envelope = request
            .with_from(self.address)
            .build(&self.wallet)
            .await
            .map_err(|e| ScannerError::Signature(format!("Failed to sign transaction: {}", e)))?;

        Ok(SignedTransaction { envelope })
    }
}

/// A signed transaction ready for broadcast
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    envelope: TxEnvelope,
}

impl SignedTransaction {
    pub fn hash(&self) -> B256 {
        *self.envelope.tx_hash()
    }

    pub fn envelope(&self) -> &TxEnvelope {
        &self.envelope
    }

    pub fn into_envelope(self) -> TxEnvelope {
        self.envelope
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Bytes, U256};

    // Well-known development key (first account of anvil/hardhat)
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[test]
    fn test_signer_address_from_key() {
        let signer = TxSigner::from_private_key(DEV_KEY).unwrap();
        assert_eq!(signer.address(), DEV_ADDRESS.parse::<Address>().unwrap());
    }

    #[test]
    fn test_invalid_private_key() {
        let result = TxSigner::from_private_key("0x1234");
        assert!(matches!(result, Err(ScannerError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_sign_complete_request() {
        let signer = TxSigner::from_private_key(DEV_KEY).unwrap();
        let request = TransactionRequest::default()
            .with_to(Address::from([9u8; 20]))
            .with_input(Bytes::from(vec![0x01, 0x02, 0x03, 0x04]))
            .with_value(U256::ZERO)
            .with_nonce(0)
            .with_chain_id(421_614)
            .with_gas_limit(2_000_000)
            .with_max_fee_per_gas(2_000_000_000)
            .with_max_priority_fee_per_gas(1_000_000);

        let signed = signer.sign(request).await.unwrap();
        assert!(matches!(signed.envelope(), TxEnvelope::Eip1559(_)));
        assert_ne!(signed.hash(), B256::ZERO);
    }

    #[tokio::test]
    async fn test_sign_incomplete_request_fails() {
        let signer = TxSigner::from_private_key(DEV_KEY).unwrap();
        let request = TransactionRequest::default().with_to(Address::from([9u8; 20]));

        let result = signer.sign(request).await;
        assert!(matches!(result, Err(ScannerError::Signature(_))));
    }
}
