//! In-memory chain used by the integration tests

#![allow(dead_code)]

use std::sync::Mutex;

use alloy::sol_types::SolEvent;
use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;

use transfer_scanner::decoder::Transfer;
use transfer_scanner::error::{Result, ScannerError};
use transfer_scanner::provider::ChainRpc;
use transfer_scanner::types::{LogEntry, LogQuery, TransactionDetail};

pub const TOKEN: Address = Address::repeat_byte(0x58);
pub const GENESIS_TIMESTAMP: u64 = 1_700_000_000;

/// Chain whose block `n` has timestamp `GENESIS_TIMESTAMP + n * block_time`
pub struct MockChain {
    pub head: u64,
    pub block_time: u64,
    logs: Vec<LogEntry>,
    queries: Mutex<Vec<LogQuery>>,
    fail_at_query: Option<usize>,
}

impl MockChain {
    pub fn new(head: u64, block_time: u64) -> Self {
        Self {
            head,
            block_time,
            logs: Vec::new(),
            queries: Mutex::new(Vec::new()),
            fail_at_query: None,
        }
    }

    pub fn timestamp_of(&self, block_number: u64) -> u64 {
        GENESIS_TIMESTAMP + block_number * self.block_time
    }

    /// Add a transfer log of `value` base units to `block_number`
    pub fn with_transfer(mut self, block_number: u64, value: U256) -> Self {
        let log_index = self.logs.iter().filter(|l| l.block_number == block_number).count() as u64;
        let event = Transfer {
            from: Address::repeat_byte(0x01),
            to: Address::repeat_byte(0x02),
            value,
        };
        let log_data = event.encode_log_data();
        self.logs.push(LogEntry {
            address: TOKEN,
            block_number,
            block_hash: Some(B256::with_last_byte((block_number % 256) as u8)),
            block_timestamp: self.timestamp_of(block_number),
            transaction_hash: Some(tx_hash(block_number, log_index)),
            transaction_index: Some(log_index),
            log_index: Some(log_index),
            topics: log_data.topics().to_vec(),
            data: log_data.data.clone(),
        });
        self
    }

    /// One transfer per block in `from..=to`, value equal to the block number
    pub fn with_transfer_per_block(mut self, from: u64, to: u64) -> Self {
        for block_number in from..=to {
            self = self.with_transfer(block_number, U256::from(block_number));
        }
        self
    }

    /// Add a log that is not a transfer
    pub fn with_raw_log(mut self, block_number: u64, topic: B256, data: Bytes) -> Self {
        self.logs.push(LogEntry {
            address: TOKEN,
            block_number,
            block_hash: None,
            block_timestamp: self.timestamp_of(block_number),
            transaction_hash: Some(tx_hash(block_number, 99)),
            transaction_index: Some(99),
            log_index: Some(99),
            topics: vec![topic],
            data,
        });
        self
    }

    /// Fail the `n`-th log query (zero-based)
    pub fn failing_at(mut self, n: usize) -> Self {
        self.fail_at_query = Some(n);
        self
    }

    pub fn queries(&self) -> Vec<LogQuery> {
        self.queries.lock().unwrap().clone()
    }
}

pub fn tx_hash(block_number: u64, log_index: u64) -> B256 {
    let mut bytes = [0u8; 32];
    bytes[..8].copy_from_slice(&block_number.to_be_bytes());
    bytes[8..16].copy_from_slice(&log_index.to_be_bytes());
    B256::from(bytes)
}

#[async_trait]
impl ChainRpc for MockChain {
    async fn block_number(&self) -> Result<u64> {
        Ok(self.head)
    }

    async fn get_logs(&self, query: &LogQuery) -> Result<Vec<LogEntry>> {
        let mut queries = self.queries.lock().unwrap();
        if self.fail_at_query == Some(queries.len()) {
            return Err(ScannerError::Rpc("connection reset".to_string()));
        }
        queries.push(*query);

        let mut logs: Vec<LogEntry> = self
            .logs
            .iter()
            .filter(|log| log.block_number >= query.from_block && log.block_number <= query.to_block)
            .filter(|log| log.address == query.address)
            .filter(|log| query.topic.map_or(true, |topic| log.topics.first() == Some(&topic)))
            .cloned()
            .collect();
        logs.sort_by_key(|log| (log.block_number, log.log_index));
        Ok(logs)
    }

    async fn get_transaction(&self, hash: B256) -> Result<Option<TransactionDetail>> {
        Ok(self
            .logs
            .iter()
            .find(|log| log.transaction_hash == Some(hash))
            .map(|log| TransactionDetail {
                hash,
                from: Address::repeat_byte(0x01),
                to: Some(log.address),
                value: U256::ZERO,
                nonce: 0,
                gas_limit: 60_000,
                block_number: Some(log.block_number),
                input_len: 68,
            }))
    }
}
