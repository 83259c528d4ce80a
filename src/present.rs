//! Present contract interaction: encode, sign and broadcast `unwrapPresent`

use alloy::network::TransactionBuilder;
use alloy::rpc::types::TransactionRequest;
use alloy::sol;
use alloy::sol_types::SolCall;
use alloy_primitives::{Address, Bytes, B256, U256};
use tracing::info;

use crate::error::Result;
use crate::provider::AlloyChainClient;
use crate::signer::{SignedTransaction, TxSigner};
use crate::types::TxReceiptSummary;

sol! {
    /// Gift wrapping contract: assets are wrapped for recipients and unwrapped by them
    contract Present {
        struct Asset {
            address tokens;
            uint256 amounts;
        }

        function wrapPresent(address[] calldata recipients, Asset[] calldata content) external payable;

        function unwrapPresent(bytes32 presentId) external;
    }
}

/// Outcome of an `unwrapPresent` call
#[derive(Debug)]
pub enum PresentOutcome {
    /// Signed but not broadcast
    Signed(SignedTransaction),
    /// Broadcast and mined
    Mined(TxReceiptSummary),
}

/// Client for the present contract
pub struct PresentClient<'a> {
    chain: &'a AlloyChainClient,
    signer: &'a TxSigner,
    address: Address,
    gas_limit: u64,
}

impl<'a> PresentClient<'a> {
    pub fn new(chain: &'a AlloyChainClient, signer: &'a TxSigner, address: Address, gas_limit: u64) -> Self {
        Self {
            chain,
            signer,
            address,
            gas_limit,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Unsigned request for `unwrapPresent(present_id)`
    pub fn unwrap_request(&self, present_id: B256) -> TransactionRequest {
        unwrap_request(self.address, present_id, self.gas_limit)
    }

    /// Sign `unwrapPresent(present_id)` and, unless `dry_run`, broadcast it
    pub async fn unwrap_present(&self, present_id: B256, dry_run: bool) -> Result<PresentOutcome> {
        let request = self.unwrap_request(present_id);
        let request = self.chain.prepare_request(request, self.signer.address()).await?;
        let signed = self.signer.sign(request).await?;
        info!("Signed unwrapPresent({}) as {}", present_id, signed.hash());

        if dry_run {
            return Ok(PresentOutcome::Signed(signed));
        }

        let receipt = self.chain.send_signed(signed).await?;
        info!("Transaction mined: {}", receipt.transaction_hash);
        Ok(PresentOutcome::Mined(receipt))
    }
}

/// Calldata of `unwrapPresent(present_id)`
pub fn unwrap_calldata(present_id: B256) -> Bytes {
    Present::unwrapPresentCall { presentId: present_id }.abi_encode().into()
}

fn unwrap_request(contract: Address, present_id: B256, gas_limit: u64) -> TransactionRequest {
    TransactionRequest::default()
        .with_to(contract)
        .with_input(unwrap_calldata(present_id))
        .with_value(U256::ZERO)
        .with_gas_limit(gas_limit)
}
