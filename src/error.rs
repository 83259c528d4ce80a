//! Error types for the transfer scanner

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, ScannerError>;

/// Main error type for the library
#[derive(Debug, Error)]
pub enum ScannerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Configuration source could not be read or deserialized
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    /// Log query, transaction lookup or broadcast failed against the RPC endpoint
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Event payload does not match the expected schema
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// Backward scan hit its query cap before covering the time window
    #[error(
        "Scan window exhausted after {iterations} queries: cursor at block {cursor_block}, timestamp {cursor_timestamp}"
    )]
    WindowExhausted {
        iterations: u64,
        cursor_block: u64,
        cursor_timestamp: u64,
    },

    /// Signature error
    #[error("Signature error: {0}")]
    Signature(String),

    /// Transaction error
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
