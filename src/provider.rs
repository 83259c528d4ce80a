//! Chain RPC collaborator and its alloy HTTP implementation

use std::collections::BTreeMap;

use alloy::consensus::Transaction as ConsensusTx;
use alloy::eips::BlockNumberOrTag;
use alloy::network::{ReceiptResponse, TransactionBuilder, TransactionResponse};
use alloy::providers::fillers::{
    BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller,
};
use alloy::providers::{Identity, Provider, ProviderBuilder, RootProvider};
use alloy::rpc::types::{Filter, Log as RpcLog, TransactionRequest};
use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::ChainConfig;
use crate::error::{Result, ScannerError};
use crate::signer::SignedTransaction;
use crate::types::{LogEntry, LogQuery, TransactionDetail, TxReceiptSummary};

/// Provider type with the recommended fillers of `ProviderBuilder::new()`
pub type RpcProvider = FillProvider<
    JoinFill<Identity, JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>>,
    RootProvider,
>;

/// The queries the scanner and the CLI need from a chain node
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// Latest block number
    async fn block_number(&self) -> Result<u64>;

    /// Logs in `[from_block, to_block]`, in ascending (block, log index) order
    async fn get_logs(&self, query: &LogQuery) -> Result<Vec<LogEntry>>;

    /// Transaction by hash, `None` if the node does not know it
    async fn get_transaction(&self, hash: B256) -> Result<Option<TransactionDetail>>;
}

/// HTTP JSON-RPC client backed by an alloy provider
#[derive(Clone)]
pub struct AlloyChainClient {
    provider: RpcProvider,
    rpc_url: reqwest::Url,
}

impl std::fmt::Debug for AlloyChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlloyChainClient").field("rpc_url", &self.rpc_url.as_str()).finish()
    }
}

impl AlloyChainClient {
    /// Create a client for the configured endpoint.
    ///
    /// When `chain_id` is configured the endpoint's chain id is checked against it.
    pub async fn connect(config: &ChainConfig) -> Result<Self> {
        let rpc_url: reqwest::Url = config
            .rpc_url
            .parse()
            .map_err(|e| ScannerError::Configuration(format!("Invalid RPC URL: {}", e)))?;

        let provider = ProviderBuilder::new().connect_http(rpc_url.clone());
        info!("Connecting to RPC endpoint: {}", rpc_url);

        let client = Self { provider, rpc_url };

        if let Some(expected) = config.chain_id {
            let chain_id = client.chain_id().await?;
            if chain_id != expected {
                return Err(ScannerError::Configuration(format!(
                    "Chain ID mismatch: expected {}, got {}",
                    expected, chain_id
                )));
            }
            info!("Chain ID: {}", chain_id);
        }

        Ok(client)
    }

    pub fn provider(&self) -> &RpcProvider {
        &self.provider
    }

    pub async fn chain_id(&self) -> Result<u64> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| ScannerError::Rpc(format!("Failed to get chain id: {}", e)))
    }

    /// Timestamp of a block header
    pub async fn block_timestamp(&self, block_number: u64) -> Result<u64> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Number(block_number))
            .await
            .map_err(|e| ScannerError::Rpc(format!("Failed to get block {}: {}", block_number, e)))?
            .ok_or_else(|| ScannerError::Rpc(format!("Block {} not found", block_number)))?;

        Ok(block.header.timestamp)
    }

    /// Fill nonce, EIP-1559 fees and chain id of a request sent from `from`
    pub async fn prepare_request(&self, request: TransactionRequest, from: Address) -> Result<TransactionRequest> {
        let nonce = self
            .provider
            .get_transaction_count(from)
            .pending()
            .await
            .map_err(|e| ScannerError::Rpc(format!("Failed to get nonce: {}", e)))?;
        let fees = self
            .provider
            .estimate_eip1559_fees()
            .await
            .map_err(|e| ScannerError::Rpc(format!("Failed to estimate fees: {}", e)))?;
        let chain_id = self.chain_id().await?;

        debug!(
            "Prepared request: nonce {}, max fee {}, priority fee {}, chain {}",
            nonce, fees.max_fee_per_gas, fees.max_priority_fee_per_gas, chain_id
        );

        Ok(request
            .with_from(from)
            .with_nonce(nonce)
            .with_chain_id(chain_id)
            .with_max_fee_per_gas(fees.max_fee_per_gas)
            .with_max_priority_fee_per_gas(fees.max_priority_fee_per_gas))
    }

    /// Broadcast a signed transaction and wait for its receipt
    pub async fn send_signed(&self, signed: SignedTransaction) -> Result<TxReceiptSummary> {
        let hash = signed.hash();
        let pending = self
            .provider
            .send_tx_envelope(signed.into_envelope())
            .await
            .map_err(|e| ScannerError::Transaction(format!("Failed to broadcast {}: {}", hash, e)))?;
        info!("Transaction {} broadcast, waiting for receipt", hash);

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ScannerError::Transaction(format!("Failed to get receipt: {}", e)))?;

        Ok(TxReceiptSummary {
            transaction_hash: receipt.transaction_hash(),
            block_number: receipt.block_number(),
            gas_used: receipt.gas_used(),
            success: receipt.status(),
        })
    }

    fn log_filter(query: &LogQuery) -> Filter {
        let filter = Filter::new()
            .address(query.address)
            .from_block(query.from_block)
            .to_block(query.to_block);
        match query.topic {
            Some(topic) => filter.event_signature(topic),
            None => filter,
        }
    }
}

#[async_trait]
impl ChainRpc for AlloyChainClient {
    async fn block_number(&self) -> Result<u64> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| ScannerError::Rpc(format!("Failed to get block number: {}", e)))
    }

    async fn get_logs(&self, query: &LogQuery) -> Result<Vec<LogEntry>> {
        let filter = Self::log_filter(query);
        let logs = self.provider.get_logs(&filter).await.map_err(|e| {
            ScannerError::Rpc(format!(
                "Failed to get logs for blocks {}..={}: {}",
                query.from_block, query.to_block, e
            ))
        })?;

        // Older nodes omit `blockTimestamp`; fetch each missing header once per batch.
        let mut timestamps: BTreeMap<u64, u64> = BTreeMap::new();
        let mut entries = Vec::with_capacity(logs.len());
        for log in logs {
            let block_number = log
                .block_number
                .ok_or_else(|| ScannerError::Rpc("Log without block number (pending log)".to_string()))?;
            let block_timestamp = match log.block_timestamp {
                Some(ts) => ts,
                None => match timestamps.get(&block_number) {
                    Some(ts) => *ts,
                    None => {
                        let ts = self.block_timestamp(block_number).await?;
                        timestamps.insert(block_number, ts);
                        ts
                    }
                },
            };
            entries.push(log_entry(log, block_number, block_timestamp));
        }

        Ok(entries)
    }

    async fn get_transaction(&self, hash: B256) -> Result<Option<TransactionDetail>> {
        let tx = self
            .provider
            .get_transaction_by_hash(hash)
            .await
            .map_err(|e| ScannerError::Rpc(format!("Failed to get transaction {}: {}", hash, e)))?;

        Ok(tx.map(|tx| TransactionDetail {
            hash: TransactionResponse::tx_hash(&tx),
            from: TransactionResponse::from(&tx),
            to: ConsensusTx::to(&tx),
            value: ConsensusTx::value(&tx),
            nonce: ConsensusTx::nonce(&tx),
            gas_limit: ConsensusTx::gas_limit(&tx),
            block_number: TransactionResponse::block_number(&tx),
            input_len: ConsensusTx::input(&tx).len(),
        }))
    }
}

fn log_entry(log: RpcLog, block_number: u64, block_timestamp: u64) -> LogEntry {
    LogEntry {
        address: log.address(),
        block_number,
        block_hash: log.block_hash,
        block_timestamp,
        transaction_hash: log.transaction_hash,
        transaction_index: log.transaction_index,
        log_index: log.log_index,
        topics: log.topics().to_vec(),
        data: log.data().data.clone(),
    }
}
