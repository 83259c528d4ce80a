use crate::decoder::TransferRecord;

/// Sort transfers by value, largest first, and keep the first `top_n`.
///
/// The sort is stable: equal values keep their scan order, newest first.
pub fn rank_by_value(mut records: Vec<TransferRecord>, top_n: usize) -> Vec<TransferRecord> {
    records.sort_by(|a, b| b.amount.cmp(&a.amount));
    records.truncate(top_n);
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::TokenAmount;
    use crate::types::LogEntry;
    use alloy_primitives::{Address, Bytes, U256};

    fn record(block_number: u64, value: u64) -> TransferRecord {
        TransferRecord {
            entry: LogEntry {
                address: Address::ZERO,
                block_number,
                block_hash: None,
                block_timestamp: block_number * 12,
                transaction_hash: None,
                transaction_index: None,
                log_index: None,
                topics: vec![],
                data: Bytes::new(),
            },
            from: Address::ZERO,
            to: Address::ZERO,
            value: U256::from(value),
            amount: TokenAmount::new(U256::from(value), 18).unwrap(),
        }
    }

    #[test]
    fn test_rank_descending_and_truncate() {
        let records = vec![record(5, 10), record(4, 30), record(3, 20), record(2, 5)];

        let top = rank_by_value(records, 2);
        let values: Vec<U256> = top.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![U256::from(30u64), U256::from(20u64)]);
    }

    #[test]
    fn test_rank_ties_keep_scan_order() {
        let records = vec![record(9, 7), record(8, 7), record(7, 100), record(6, 7)];

        let top = rank_by_value(records, 10);
        let blocks: Vec<u64> = top.iter().map(|r| r.entry.block_number).collect();
        assert_eq!(blocks, vec![7, 9, 8, 6]);
    }

    #[test]
    fn test_rank_top_larger_than_input() {
        let top = rank_by_value(vec![record(1, 1)], 50);
        assert_eq!(top.len(), 1);
        assert!(rank_by_value(Vec::new(), 3).is_empty());
    }
}
