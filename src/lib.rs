//! ERC20 transfer log scanner
//!
//! Fetches the `Transfer` logs of a token contract over a time window by
//! scanning block ranges backward from a starting block, decodes and ranks
//! them by value, and signs and broadcasts contract calls, built on Alloy.
//!
//! # Example
//!
//! ```rust,no_run
//! use transfer_scanner::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load("config.toml")?;
//!     let client = AlloyChainClient::connect(&config.chain).await?;
//!
//!     let start_block = client.block_number().await?;
//!     let min_timestamp = chrono::Utc::now().timestamp() as u64 - config.scan.time_range_secs;
//!     let window = ScanWindow::new(
//!         config.contract_address()?,
//!         config.event_topic(),
//!         start_block,
//!         config.scan.block_step,
//!         min_timestamp,
//!     )?;
//!
//!     let logs = LogScanner::new(&client)
//!         .with_limits(config.scan_limits())
//!         .scan(&window)
//!         .await?;
//!
//!     let transfers = decode_transfers(&logs, config.token.decimals);
//!     for transfer in rank_by_value(transfers, config.token.top_n) {
//!         println!("{} -> {}: {}", transfer.from, transfer.to, transfer.amount);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod amount;
pub mod config;
pub mod decoder;
pub mod error;
pub mod present;
pub mod provider;
pub mod ranking;
pub mod scanner;
pub mod signer;
pub mod types;

// Re-export commonly used types
pub use crate::amount::TokenAmount;
pub use crate::config::Config;
pub use crate::decoder::{decode_transfer, decode_transfers, transfer_topic, TransferRecord};
pub use crate::error::{Result, ScannerError};
pub use crate::present::{PresentClient, PresentOutcome};
pub use crate::provider::{AlloyChainClient, ChainRpc};
pub use crate::ranking::rank_by_value;
pub use crate::scanner::{trim_older_than, LogScanner, ScanLimits};
pub use crate::signer::{SignedTransaction, TxSigner};
pub use crate::types::{LogEntry, LogQuery, ScanWindow, TransactionDetail, TxReceiptSummary};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::decoder::{decode_transfers, TransferRecord};
    pub use crate::error::{Result, ScannerError};
    pub use crate::provider::{AlloyChainClient, ChainRpc};
    pub use crate::ranking::rank_by_value;
    pub use crate::scanner::{LogScanner, ScanLimits};
    pub use crate::types::{LogEntry, ScanWindow};
    pub use alloy_primitives::{Address, B256, U256};
}
