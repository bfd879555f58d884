use std::path::PathBuf;

use alloy_network::AnyNetwork;
use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tokio::time::Instant;
use tracing::{error, info, warn};
use tracing_subscriber::{self, EnvFilter};

use zk_bridge_events_snapshot::fetcher::rpc::{
    connect_http, get_chain_id, get_latest_block_number, RpcLogSource,
};
use zk_bridge_events_snapshot::fetcher::{FetchConfig, LogFetcher};
use zk_bridge_events_snapshot::models::common::{ChainInfo, Settings};
use zk_bridge_events_snapshot::models::window::QueryWindow;
use zk_bridge_events_snapshot::snapshot::assemble::assemble_payload;
use zk_bridge_events_snapshot::snapshot::run_snapshot;
use zk_bridge_events_snapshot::utils::retry::RetryConfig;
use zk_bridge_events_snapshot::utils::{
    load_settings, parse_address, parse_topic0, resolve_block_range,
};

#[derive(Debug, Parser)]
#[command(name = "zk-bridge-events-snapshot")]
#[command(about = "Snapshot L1 bridge/rollup events into a ZK-friendly commitment", long_about = None)]
struct Cli {
    /// Bridge / rollup / messaging contract address
    address: String,
    /// RPC URL (default from RPC_URL env)
    #[arg(long)]
    rpc: Option<String>,
    /// Start block number (default: to-block - blocks + 1)
    #[arg(long)]
    from_block: Option<u64>,
    /// End block number (default: latest block)
    #[arg(long)]
    to_block: Option<u64>,
    /// Number of recent blocks to cover if from/to are not set
    #[arg(long)]
    blocks: Option<u64>,
    /// Optional topic0 (event signature hash) to filter logs
    #[arg(long)]
    topic0: Option<String>,
    /// Maximum logs to keep in the snapshot (0 = no limit)
    #[arg(long)]
    max_logs: Option<usize>,
    /// Largest block span per eth_getLogs request (0 = single request)
    #[arg(long)]
    max_block_range: Option<u64>,
    /// Concurrent eth_getLogs requests when the range is split
    #[arg(long)]
    concurrency: Option<usize>,
    /// Abort the fetch after this many seconds (0 = no deadline)
    #[arg(long)]
    deadline_secs: Option<u64>,
    /// Settings file (YAML)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Pretty-print JSON instead of compact JSON
    #[arg(long)]
    pretty: bool,
    /// Disable the human-readable summary (JSON only)
    #[arg(long)]
    no_human: bool,
}

impl Cli {
    // Flags take precedence over file and environment settings
    fn apply(&self, settings: &mut Settings) {
        if let Some(rpc) = &self.rpc {
            settings.rpc_url = rpc.clone();
        }
        if let Some(blocks) = self.blocks {
            settings.blocks = blocks;
        }
        if let Some(max_logs) = self.max_logs {
            settings.max_logs = max_logs;
        }
        if let Some(max_block_range) = self.max_block_range {
            settings.max_block_range = max_block_range;
        }
        if let Some(concurrency) = self.concurrency {
            settings.concurrency = concurrency;
        }
        if let Some(deadline_secs) = self.deadline_secs {
            settings.deadline_secs = deadline_secs;
        }
    }
}

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout carries only the JSON payload
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut settings = load_settings(cli.config.as_deref())?;
    cli.apply(&mut settings);
    info!("Config loaded successfully");

    if settings.uses_placeholder_rpc() {
        warn!("RPC_URL is not set and the default RPC still uses a placeholder key. Set RPC_URL or pass --rpc.");
    }

    let address = parse_address(&cli.address)?;
    let topic0 = cli.topic0.as_deref().map(parse_topic0).transpose()?;
    let retry_config = RetryConfig::from(&settings.retry);

    // Connect and read chain info
    let connect_start = Instant::now();
    let provider = connect_http(&settings.rpc_url)?;
    let tip = get_latest_block_number::<_, AnyNetwork>(&provider, &retry_config)
        .await
        .with_context(|| format!("Failed to connect to RPC endpoint {}", settings.rpc_url))?;
    let chain = match get_chain_id::<_, AnyNetwork>(&provider, &retry_config).await {
        Ok(chain_id) => ChainInfo::from_chain_id(chain_id),
        Err(e) => {
            warn!("Chain info unavailable: {:#}", e);
            ChainInfo::default()
        }
    };
    info!(
        "Connected to {} (chainId {:?}, tip={}) in {:.2}s",
        chain.network.as_deref().unwrap_or("RPC"),
        chain.chain_id,
        tip,
        connect_start.elapsed().as_secs_f64()
    );

    let (from_block, to_block) =
        resolve_block_range(cli.from_block, cli.to_block, settings.blocks, tip)?;
    info!("zk_bridge_events_snapshot at UTC {}", Utc::now().format("%Y-%m-%d %H:%M:%S"));
    info!("Using RPC endpoint: {}", settings.rpc_url);
    info!("Block range resolved to [{}, {}] (tip={})", from_block, to_block, tip);

    let window = QueryWindow::new(address, from_block, to_block, topic0)?;
    let fetcher = LogFetcher::new(RpcLogSource::new(provider), FetchConfig::from(&settings));

    let run_start = Instant::now();
    let snapshot = run_snapshot(&fetcher, &window, settings.max_logs)
        .await
        .with_context(|| {
            format!(
                "Snapshot failed for address={} blocks=[{}, {}] topic0={:?} maxLogs={}",
                address, from_block, to_block, cli.topic0, settings.max_logs
            )
        })?;
    let elapsed_total = run_start.elapsed();

    let payload = assemble_payload(snapshot, chain, address, Utc::now());

    if !cli.no_human {
        let meta = &payload.data.meta;
        info!(
            "{} (chainId {:?}) bridge={}",
            payload.network.as_deref().unwrap_or("Unknown network"),
            payload.chain_id,
            payload.bridge_address
        );
        info!(
            "Logs: {} (unique tx={}) blocks [{:?}, {:?}] commitment={}",
            meta.log_count,
            meta.unique_tx_count,
            meta.from_block_effective,
            meta.to_block_effective,
            meta.commitment_keccak
        );
        info!("Total elapsed: {:.2}s", elapsed_total.as_secs_f64());
        info!("The commitmentKeccak can be used as a public input in ZK or soundness circuits to bind L2 logic to specific L1 bridge events.");
    }

    let output = if cli.pretty {
        serde_json::to_string_pretty(&payload)?
    } else {
        serde_json::to_string(&payload)?
    };
    println!("{output}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use zk_bridge_events_snapshot::utils::build_settings;

    #[test]
    fn test_flags_override_settings() {
        let env = HashMap::from([
            ("BRIDGE_SNAPSHOT_MAX_LOGS".to_string(), "25".to_string()),
            ("RPC_URL".to_string(), "https://env.example".to_string()),
        ]);
        let mut settings = build_settings(None, env).unwrap();

        let cli = Cli::parse_from([
            "zk-bridge-events-snapshot",
            "0x3154Cf16ccdb4C6d922629664174b904d80F2C35",
            "--rpc",
            "https://flag.example",
            "--max-logs",
            "7",
        ]);
        cli.apply(&mut settings);

        assert_eq!(settings.rpc_url, "https://flag.example");
        assert_eq!(settings.max_logs, 7);
        assert_eq!(settings.blocks, 2000);
    }
}
