use std::str::FromStr;

use alloy::primitives::keccak256;
use alloy_primitives::{Address, B256};
use serde::Deserialize;

use crate::decoder::TRANSFER_SIGNATURE;
use crate::error::{Result, ScannerError};
use crate::scanner::{ScanLimits, DEFAULT_MAX_ITERATIONS};

/// Environment variable holding the signing key
pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub chain: ChainConfig,
    pub scan: ScanConfig,
    #[serde(default)]
    pub token: TokenConfig,
    pub present: Option<PresentConfig>,
    #[serde(default)]
    pub service: ServiceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    pub rpc_url: String,
    /// Checked against the endpoint when set
    pub chain_id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    pub contract_address: String,
    #[serde(default = "default_event_signature")]
    pub event_signature: String,
    #[serde(default = "default_block_step")]
    pub block_step: u64,
    #[serde(default = "default_time_range_secs")]
    pub time_range_secs: u64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u64,
    #[serde(default)]
    pub floor_block: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    #[serde(default = "default_decimals")]
    pub decimals: u8,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            decimals: default_decimals(),
            top_n: default_top_n(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PresentConfig {
    pub contract_address: String,
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_event_signature() -> String {
    TRANSFER_SIGNATURE.to_string()
}

fn default_block_step() -> u64 {
    500
}

fn default_time_range_secs() -> u64 {
    7 * 24 * 60 * 60
}

fn default_max_iterations() -> u64 {
    DEFAULT_MAX_ITERATIONS
}

fn default_decimals() -> u8 {
    18
}

fn default_top_n() -> usize {
    10
}

fn default_gas_limit() -> u64 {
    2_000_000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from `path` (optional file) and `SCANNER__*` environment variables
    pub fn load(path: &str) -> Result<Self> {
        let config_builder = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            // e.g. SCANNER__SCAN__BLOCK_STEP=1000
            .add_source(
                config::Environment::with_prefix("SCANNER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config_builder.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string, without environment overrides
    pub fn from_toml(toml: &str) -> Result<Self> {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.scan.block_step == 0 {
            return Err(ScannerError::Configuration("scan.block_step must be greater than zero".to_string()));
        }
        if self.scan.time_range_secs == 0 {
            return Err(ScannerError::Configuration("scan.time_range_secs must be greater than zero".to_string()));
        }
        if self.scan.max_iterations == 0 {
            return Err(ScannerError::Configuration("scan.max_iterations must be greater than zero".to_string()));
        }
        self.contract_address()?;
        if let Some(present) = &self.present {
            parse_address(&present.contract_address, "present.contract_address")?;
        }
        Ok(())
    }

    pub fn contract_address(&self) -> Result<Address> {
        parse_address(&self.scan.contract_address, "scan.contract_address")
    }

    /// Topic 0 filter derived from the configured event signature
    pub fn event_topic(&self) -> B256 {
        keccak256(self.scan.event_signature.as_bytes())
    }

    pub fn scan_limits(&self) -> ScanLimits {
        ScanLimits {
            max_iterations: self.scan.max_iterations,
            floor_block: self.scan.floor_block,
        }
    }

    pub fn present(&self) -> Result<&PresentConfig> {
        self.present
            .as_ref()
            .ok_or_else(|| ScannerError::Configuration("missing [present] section".to_string()))
    }

    /// Signing key from the process environment
    pub fn private_key() -> Result<String> {
        std::env::var(PRIVATE_KEY_ENV)
            .map_err(|_| ScannerError::Configuration(format!("{} is not set", PRIVATE_KEY_ENV)))
    }
}

pub fn parse_address(value: &str, field: &str) -> Result<Address> {
    Address::from_str(value.trim())
        .map_err(|e| ScannerError::Configuration(format!("Invalid address in {}: {}", field, e)))
}
