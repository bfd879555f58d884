use alloy_network::AnyNetwork;
use anyhow::Result;

use zk_bridge_events_snapshot::fetcher::rpc::{connect_http, get_chain_id, RpcLogSource};
use zk_bridge_events_snapshot::fetcher::{FetchConfig, LogFetcher};
use zk_bridge_events_snapshot::models::window::QueryWindow;
use zk_bridge_events_snapshot::snapshot::run_snapshot;
use zk_bridge_events_snapshot::utils::retry::RetryConfig;
use zk_bridge_events_snapshot::utils::{parse_address, parse_topic0};

//////// Ethereum test params ////////
const ETH_RPC_URL: &str = "https://eth.drpc.org";
// USDC token contract and the ERC-20 Transfer event signature
const USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
const TRANSFER_TOPIC: &str = "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";
// (from_block, to_block) of finalized history
const ETH_WINDOWS: [(u64, u64); 2] = [(19426589, 19426590), (12965000, 12965001)];

#[tokio::test]
#[ignore = "requires network access to a public Ethereum RPC"]
async fn test_live_snapshot_is_reproducible() -> Result<()> {
    let provider = connect_http(ETH_RPC_URL)?;
    let chain_id = get_chain_id::<_, AnyNetwork>(&provider, &RetryConfig::default()).await?;
    assert_eq!(chain_id, 1);

    let address = parse_address(USDC)?;
    let topic0 = parse_topic0(TRANSFER_TOPIC)?;

    let single = LogFetcher::new(RpcLogSource::new(provider.clone()), FetchConfig::default());
    let paged = LogFetcher::new(
        RpcLogSource::new(provider),
        FetchConfig {
            max_block_range: 1,
            concurrency: 2,
            ..FetchConfig::default()
        },
    );

    for (from_block, to_block) in ETH_WINDOWS {
        println!("\nSnapshotting USDC transfers in blocks [{}, {}]", from_block, to_block);
        let window = QueryWindow::new(address, from_block, to_block, Some(topic0))?;

        let first = run_snapshot(&single, &window, 0).await?;
        let second = run_snapshot(&paged, &window, 0).await?;

        assert_eq!(
            first.meta.commitment_keccak, second.meta.commitment_keccak,
            "Blocks [{}, {}]: commitment changed with pagination",
            from_block, to_block
        );
        assert_eq!(first.logs, second.logs);
        assert!(first.logs.iter().all(|log| log.topics[0] == topic0));

        println!("- {} logs", first.meta.log_count);
        println!("- commitment {}", first.meta.commitment_keccak);
    }

    Ok(())
}
