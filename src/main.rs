use std::str::FromStr;

use alloy_primitives::B256;
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use transfer_scanner::config::{parse_address, Config};
use transfer_scanner::decoder::{decode_transfers, TransferRecord};
use transfer_scanner::present::{PresentClient, PresentOutcome};
use transfer_scanner::provider::{AlloyChainClient, ChainRpc};
use transfer_scanner::ranking::rank_by_value;
use transfer_scanner::scanner::LogScanner;
use transfer_scanner::signer::TxSigner;
use transfer_scanner::types::{LogEntry, ScanWindow};

#[derive(Parser, Debug)]
#[command(name = "transfer-scanner")]
#[command(about = "Scan, rank and inspect ERC20 transfers; sign contract calls", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "SCANNER_CONFIG", default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scan transfers of the configured token over a time window and rank them by value
    Transfers {
        /// Block to scan back from (latest block by default)
        #[arg(long)]
        start_block: Option<u64>,

        /// Time window in seconds (overrides scan.time_range_secs)
        #[arg(long)]
        time_range: Option<u64>,

        /// Number of transfers to show (overrides token.top_n)
        #[arg(short = 'n', long)]
        top: Option<usize>,

        /// Look up the transaction of the largest transfer
        #[arg(long)]
        details: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Fetch the configured event logs of a single block range
    Logs {
        /// First block (defaults to `to_block - span + 1`)
        #[arg(long)]
        from_block: Option<u64>,

        /// Last block (latest block by default)
        #[arg(long)]
        to_block: Option<u64>,

        /// Number of blocks when `from_block` is not given
        #[arg(long, default_value = "400")]
        span: u64,
    },

    /// Show a transaction by hash
    Tx {
        /// Transaction hash
        hash: String,
    },

    /// List every event a contract emitted since a block
    Events {
        /// Contract address (scan.contract_address by default)
        #[arg(long)]
        contract: Option<String>,

        #[arg(long)]
        from_block: u64,

        /// Last block (latest block by default)
        #[arg(long)]
        to_block: Option<u64>,
    },

    /// Sign and broadcast `unwrapPresent(presentId)` with the key in PRIVATE_KEY
    UnwrapPresent {
        /// Present id (bytes32, hex)
        present_id: String,

        /// Sign only, do not broadcast
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::load(&cli.config).with_context(|| format!("Failed to load configuration from {}", cli.config))?;

    init_tracing(&config.service.log_level);
    info!("Configuration loaded successfully");

    let client = AlloyChainClient::connect(&config.chain).await?;

    match cli.command {
        Command::Transfers {
            start_block,
            time_range,
            top,
            details,
            json,
        } => {
            let time_range = time_range.unwrap_or(config.scan.time_range_secs);
            let top = top.unwrap_or(config.token.top_n);
            run_transfers(&config, &client, start_block, time_range, top, details, json).await
        }
        Command::Logs {
            from_block,
            to_block,
            span,
        } => {
            let to_block = match to_block {
                Some(block) => block,
                None => client.block_number().await?,
            };
            let from_block = from_block.unwrap_or_else(|| to_block.saturating_sub(span.saturating_sub(1)));
            let logs = LogScanner::new(&client)
                .fetch_range(config.contract_address()?, Some(config.event_topic()), from_block, to_block)
                .await?;
            print_logs(&logs);
            Ok(())
        }
        Command::Tx { hash } => {
            let hash = parse_hash(&hash)?;
            match client.get_transaction(hash).await? {
                Some(tx) => println!("{}", serde_json::to_string_pretty(&tx)?),
                None => println!("Transaction {} not found", hash),
            }
            Ok(())
        }
        Command::Events {
            contract,
            from_block,
            to_block,
        } => {
            let address = match contract {
                Some(contract) => parse_address(&contract, "--contract")?,
                None => config.contract_address()?,
            };
            let to_block = match to_block {
                Some(block) => block,
                None => client.block_number().await?,
            };
            let logs = LogScanner::new(&client).fetch_range(address, None, from_block, to_block).await?;
            print_logs(&logs);
            Ok(())
        }
        Command::UnwrapPresent { present_id, dry_run } => {
            let present = config.present()?;
            let signer = TxSigner::from_private_key(&Config::private_key()?)?;
            info!("Signing as {}", signer.address());

            let address = parse_address(&present.contract_address, "present.contract_address")?;
            let present_client = PresentClient::new(&client, &signer, address, present.gas_limit);
            match present_client.unwrap_present(parse_hash(&present_id)?, dry_run).await? {
                PresentOutcome::Signed(signed) => {
                    println!("Signed transaction (not broadcast): {}", signed.hash());
                }
                PresentOutcome::Mined(receipt) => {
                    println!("{}", serde_json::to_string_pretty(&receipt)?);
                    if !receipt.success {
                        warn!("Transaction {} reverted", receipt.transaction_hash);
                    }
                }
            }
            Ok(())
        }
    }
}

async fn run_transfers(
    config: &Config,
    client: &AlloyChainClient,
    start_block: Option<u64>,
    time_range: u64,
    top: usize,
    details: bool,
    json: bool,
) -> Result<()> {
    let start_block = match start_block {
        Some(block) => block,
        None => client.block_number().await?,
    };
    let now = u64::try_from(chrono::Utc::now().timestamp())?;
    let min_timestamp = now.saturating_sub(time_range);

    let window = ScanWindow::new(
        config.contract_address()?,
        config.event_topic(),
        start_block,
        config.scan.block_step,
        min_timestamp,
    )?;

    let logs = LogScanner::new(client)
        .with_limits(config.scan_limits())
        .scan(&window)
        .await?;
    info!("Total {} logs since {}", logs.len(), format_timestamp(min_timestamp));

    let transfers = decode_transfers(&logs, config.token.decimals);
    let ranked = rank_by_value(transfers, top);

    if json {
        println!("{}", serde_json::to_string_pretty(&ranked)?);
    } else {
        print_transfers(&ranked);
    }

    if details {
        let Some(largest) = ranked.first() else {
            println!("No transfers in the window");
            return Ok(());
        };
        let hash = largest
            .entry
            .transaction_hash
            .ok_or_else(|| anyhow!("Largest transfer has no transaction hash"))?;
        match client.get_transaction(hash).await? {
            Some(tx) => println!("{}", serde_json::to_string_pretty(&tx)?),
            None => println!("Transaction {} not found", hash),
        }
    }

    Ok(())
}

fn print_transfers(transfers: &[TransferRecord]) {
    for (rank, transfer) in transfers.iter().enumerate() {
        println!(
            "{:>3}. {} {} -> {} {} (block {}, tx {})",
            rank + 1,
            format_timestamp(transfer.entry.block_timestamp),
            transfer.from,
            transfer.to,
            transfer.amount,
            transfer.entry.block_number,
            transfer.entry.transaction_hash.map(|h| h.to_string()).unwrap_or_default()
        );
    }
}

fn print_logs(logs: &[LogEntry]) {
    for log in logs {
        println!(
            "block {} ({}) log {} tx {} topics {}",
            log.block_number,
            format_timestamp(log.block_timestamp),
            log.log_index.map(|i| i.to_string()).unwrap_or_default(),
            log.transaction_hash.map(|h| h.to_string()).unwrap_or_default(),
            log.topics.len()
        );
    }
    println!("Total {} logs", logs.len());
}

fn format_timestamp(timestamp: u64) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
        .unwrap_or_else(|| timestamp.to_string())
}

fn parse_hash(value: &str) -> Result<B256> {
    B256::from_str(value.trim()).map_err(|e| anyhow!("Invalid 32-byte hash {}: {}", value, e))
}

fn init_tracing(default_level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().compact())
        .init();
}
