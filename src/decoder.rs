//! ERC20 `Transfer` event decoding

use alloy::sol;
use alloy::sol_types::SolEvent;
use alloy_primitives::{Address, B256, U256};
use serde::Serialize;
use tracing::{debug, warn};

use crate::amount::TokenAmount;
use crate::error::{Result, ScannerError};
use crate::types::LogEntry;

sol! {
    /// ERC20 transfer event
    event Transfer(address indexed from, address indexed to, uint256 value);
}

/// Canonical signature of the transfer event
pub const TRANSFER_SIGNATURE: &str = "Transfer(address,address,uint256)";

/// Topic 0 of `Transfer(address,address,uint256)`
pub fn transfer_topic() -> B256 {
    Transfer::SIGNATURE_HASH
}

/// A transfer log with its decoded fields attached
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferRecord {
    pub entry: LogEntry,
    pub from: Address,
    pub to: Address,
    /// Value in base units
    pub value: U256,
    /// Value scaled by the token decimals
    pub amount: TokenAmount,
}

/// Decode one log entry as a `Transfer` event.
///
/// `from` and `to` come from topics 1 and 2, `value` from the data payload.
pub fn decode_transfer(entry: &LogEntry, decimals: u8) -> Result<TransferRecord> {
    let event = Transfer::decode_raw_log(entry.topics.iter().copied(), &entry.data).map_err(|e| {
        ScannerError::Decoding(format!(
            "Log {} in block {} is not a transfer: {}",
            entry.log_index.map(|i| i.to_string()).unwrap_or_else(|| "?".to_string()),
            entry.block_number,
            e
        ))
    })?;

    Ok(TransferRecord {
        entry: entry.clone(),
        from: event.from,
        to: event.to,
        value: event.value,
        amount: TokenAmount::new(event.value, decimals)?,
    })
}

/// Decode a scan result, skipping entries that do not match the schema.
///
/// Order of the input is preserved.
pub fn decode_transfers(entries: &[LogEntry], decimals: u8) -> Vec<TransferRecord> {
    let mut records = Vec::with_capacity(entries.len());
    for entry in entries {
        match decode_transfer(entry, decimals) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping undecodable log: {}", e),
        }
    }
    debug!("Decoded {} of {} logs", records.len(), entries.len());
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::keccak256;
    use alloy_primitives::Bytes;

    fn entry_from_event(event: &Transfer) -> LogEntry {
        let log_data = event.encode_log_data();
        LogEntry {
            address: Address::from([0x58; 20]),
            block_number: 100,
            block_hash: None,
            block_timestamp: 1_700_000_000,
            transaction_hash: Some(B256::from([1u8; 32])),
            transaction_index: Some(0),
            log_index: Some(3),
            topics: log_data.topics().to_vec(),
            data: log_data.data.clone(),
        }
    }

    #[test]
    fn test_transfer_topic_matches_signature() {
        assert_eq!(transfer_topic(), keccak256(TRANSFER_SIGNATURE));
    }

    #[test]
    fn test_decode_round_trip_with_scaling() {
        let from = Address::from([0xaa; 20]);
        let to = Address::from([0xbb; 20]);
        let value = U256::from(1_250u64) * U256::from(10u64).pow(U256::from(15));
        let entry = entry_from_event(&Transfer { from, to, value });

        let record = decode_transfer(&entry, 18).unwrap();
        assert_eq!(record.from, from);
        assert_eq!(record.to, to);
        assert_eq!(record.value, value);
        assert_eq!(record.amount.to_string(), "1.25");
        assert_eq!(record.entry, entry);
    }

    #[test]
    fn test_decode_rejects_other_event() {
        let mut entry = entry_from_event(&Transfer {
            from: Address::ZERO,
            to: Address::ZERO,
            value: U256::from(1u64),
        });
        entry.topics[0] = keccak256("Approval(address,address,uint256)");

        let result = decode_transfer(&entry, 18);
        assert!(matches!(result, Err(ScannerError::Decoding(_))));
    }

    #[test]
    fn test_decode_rejects_missing_topics() {
        let mut entry = entry_from_event(&Transfer {
            from: Address::ZERO,
            to: Address::ZERO,
            value: U256::from(1u64),
        });
        entry.topics.truncate(1);

        assert!(decode_transfer(&entry, 18).is_err());
    }

    #[test]
    fn test_decode_transfers_skips_bad_entries() {
        let good = entry_from_event(&Transfer {
            from: Address::from([1u8; 20]),
            to: Address::from([2u8; 20]),
            value: U256::from(10u64),
        });
        let mut bad = good.clone();
        bad.data = Bytes::new();

        let records = decode_transfers(&[good.clone(), bad, good], 0);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.value == U256::from(10u64)));
    }
}
