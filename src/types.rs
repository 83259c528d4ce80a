use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScannerError};

/// A single log entry returned by the chain log query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub address: Address,
    pub block_number: u64,
    pub block_hash: Option<B256>,
    pub block_timestamp: u64,
    pub transaction_hash: Option<B256>,
    pub transaction_index: Option<u64>,
    pub log_index: Option<u64>,
    /// Topic 0 is the event signature hash for non-anonymous events
    pub topics: Vec<B256>,
    pub data: Bytes,
}

impl LogEntry {
    pub fn event_signature(&self) -> Option<B256> {
        self.topics.first().copied()
    }
}

/// Parameters of a backward scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanWindow {
    contract_address: Address,
    event_topic: B256,
    start_block: u64,
    block_step: u64,
    min_timestamp: u64,
}

impl ScanWindow {
    pub fn new(
        contract_address: Address,
        event_topic: B256,
        start_block: u64,
        block_step: u64,
        min_timestamp: u64,
    ) -> Result<Self> {
        if block_step == 0 {
            return Err(ScannerError::InvalidInput("block step must be greater than zero".to_string()));
        }

        Ok(Self {
            contract_address,
            event_topic,
            start_block,
            block_step,
            min_timestamp,
        })
    }

    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    pub fn event_topic(&self) -> B256 {
        self.event_topic
    }

    pub fn start_block(&self) -> u64 {
        self.start_block
    }

    pub fn block_step(&self) -> u64 {
        self.block_step
    }

    pub fn min_timestamp(&self) -> u64 {
        self.min_timestamp
    }
}

/// Block range and filter of one `eth_getLogs` call (both bounds inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogQuery {
    pub from_block: u64,
    pub to_block: u64,
    pub address: Address,
    /// `None` matches every event of the contract
    pub topic: Option<B256>,
}

/// Transaction details as returned by `eth_getTransactionByHash`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDetail {
    pub hash: B256,
    pub from: Address,
    pub to: Option<Address>,
    pub value: U256,
    pub nonce: u64,
    pub gas_limit: u64,
    pub block_number: Option<u64>,
    pub input_len: usize,
}

/// Summary of a mined transaction receipt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceiptSummary {
    pub transaction_hash: B256,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    pub success: bool,
}
