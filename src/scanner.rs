//! Time-bounded backward log scanner
//!
//! Starting at a block, the scanner queries fixed-size block ranges moving
//! toward genesis until the logs it has collected reach back to a minimum
//! timestamp, then trims the entries older than that timestamp.

use alloy_primitives::{Address, B256};
use tracing::{debug, info};

use crate::error::{Result, ScannerError};
use crate::provider::ChainRpc;
use crate::types::{LogEntry, LogQuery, ScanWindow};

/// Default cap on the number of range queries of a single scan
pub const DEFAULT_MAX_ITERATIONS: u64 = 10_000;

/// Bounds that keep a scan from running forever over empty block stretches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanLimits {
    /// Maximum number of range queries before the scan fails
    pub max_iterations: u64,
    /// Lowest block that is ever queried; reaching it ends the scan
    pub floor_block: u64,
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            floor_block: 0,
        }
    }
}

type Clock = Box<dyn Fn() -> u64 + Send + Sync>;

/// Backward log scanner over a chain RPC client
pub struct LogScanner<'a, C: ChainRpc> {
    chain: &'a C,
    limits: ScanLimits,
    clock: Clock,
}

impl<'a, C: ChainRpc> LogScanner<'a, C> {
    pub fn new(chain: &'a C) -> Self {
        Self {
            chain,
            limits: ScanLimits::default(),
            clock: Box::new(unix_now),
        }
    }

    pub fn with_limits(mut self, limits: ScanLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Replace the wall clock used as the initial cursor timestamp
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> u64 + Send + Sync + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    pub fn limits(&self) -> ScanLimits {
        self.limits
    }

    /// Collect the logs of `window` newest first, down to `window.min_timestamp()`.
    ///
    /// A failed query aborts the whole scan. An empty batch leaves the cursor
    /// timestamp where it was, so long empty stretches are bounded only by the
    /// floor block and the iteration cap.
    pub async fn scan(&self, window: &ScanWindow) -> Result<Vec<LogEntry>> {
        let min_timestamp = window.min_timestamp();
        let step = window.block_step();

        let mut cursor_block = Some(window.start_block());
        let mut cursor_timestamp = (self.clock)();
        let mut accumulated: Vec<LogEntry> = Vec::new();
        let mut iterations = 0u64;

        info!(
            "Scanning {} back from block {} to timestamp {} in steps of {} blocks",
            window.contract_address(),
            window.start_block(),
            min_timestamp,
            step
        );

        while cursor_timestamp > min_timestamp {
            let Some(to_block) = cursor_block else {
                debug!("Reached floor block {}", self.limits.floor_block);
                break;
            };
            if to_block < self.limits.floor_block {
                debug!("Start block {} is below floor block {}", to_block, self.limits.floor_block);
                break;
            }
            if iterations >= self.limits.max_iterations {
                return Err(ScannerError::WindowExhausted {
                    iterations,
                    cursor_block: to_block,
                    cursor_timestamp,
                });
            }
            iterations += 1;

            let from_block = to_block.saturating_sub(step - 1).max(self.limits.floor_block);
            let query = LogQuery {
                from_block,
                to_block,
                address: window.contract_address(),
                topic: Some(window.event_topic()),
            };
            debug!("Querying blocks {}..={}", from_block, to_block);

            let mut batch = self.chain.get_logs(&query).await?;
            batch.reverse();

            if let Some(oldest) = batch.last() {
                cursor_timestamp = oldest.block_timestamp;
            }
            let batch_len = batch.len();
            accumulated.extend(batch);

            info!("Got {} logs, total {}", batch_len, accumulated.len());

            cursor_block = if from_block > self.limits.floor_block {
                Some(from_block - 1)
            } else {
                None
            };
        }

        trim_older_than(&mut accumulated, min_timestamp);
        info!("Scan finished after {} queries with {} logs", iterations, accumulated.len());

        Ok(accumulated)
    }

    /// Logs of a single block range, in ascending order
    pub async fn fetch_range(
        &self,
        address: Address,
        topic: Option<B256>,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<LogEntry>> {
        if from_block > to_block {
            return Err(ScannerError::InvalidInput(format!(
                "from block {} is after to block {}",
                from_block, to_block
            )));
        }

        let query = LogQuery {
            from_block,
            to_block,
            address,
            topic,
        };
        let logs = self.chain.get_logs(&query).await?;
        info!("Got {} logs in blocks {}..={}", logs.len(), from_block, to_block);
        Ok(logs)
    }
}

/// Drop the trailing run of entries older than `min_timestamp`
pub fn trim_older_than(entries: &mut Vec<LogEntry>, min_timestamp: u64) {
    while entries.last().is_some_and(|entry| entry.block_timestamp < min_timestamp) {
        entries.pop();
    }
}

fn unix_now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default()
}
