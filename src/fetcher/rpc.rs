use alloy_eips::BlockNumberOrTag;
use alloy_network::{AnyNetwork, Network};
use alloy_primitives::{Address, B256};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types_eth::{Filter, Log};
use anyhow::{anyhow, Result};
use tracing::warn;
use url::Url;

use crate::fetcher::LogSource;
use crate::models::errors::{ConfigurationError, MalformedLogError};
use crate::models::log_record::LogRecord;
use crate::utils::retry::{RetryConfig, retry};

const MAX_TOPICS: usize = 4;

/// Builds an HTTP provider for `rpc_url`.
pub fn connect_http(rpc_url: &str) -> Result<DynProvider<AnyNetwork>, ConfigurationError> {
    let url: Url = rpc_url
        .parse()
        .map_err(|_| ConfigurationError::InvalidRpcUrl {
            value: rpc_url.to_string(),
        })?;

    Ok(ProviderBuilder::new()
        .network::<AnyNetwork>()
        .connect_http(url)
        .erased())
}

pub async fn get_chain_id<P, N>(provider: &P, retry_config: &RetryConfig) -> Result<u64>
where
    P: Provider<N>,
    N: Network,
{
    retry(
        || async {
            provider.get_chain_id().await.map_err(|e| {
                warn!("Failed to get chain ID. Error details:\n{:#?}", e);
                anyhow!("RPC error: {}", e)
            })
        },
        retry_config,
        "get_chain_id",
    )
    .await
}

pub async fn get_latest_block_number<P, N>(provider: &P, retry_config: &RetryConfig) -> Result<u64>
where
    P: Provider<N>,
    N: Network,
{
    retry(
        || async {
            provider.get_block_number().await.map_err(|e| {
                warn!("Failed to get latest block number. Error details:\n{:#?}", e);
                anyhow!("RPC error: {}", e)
            })
        },
        retry_config,
        "get_latest_block_number",
    )
    .await
}

/// [`LogSource`] backed by `eth_getLogs`.
pub struct RpcLogSource<P> {
    provider: P,
}

impl<P> RpcLogSource<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P> LogSource for RpcLogSource<P>
where
    P: Provider<AnyNetwork>,
{
    async fn query(
        &self,
        address: Address,
        from_block: u64,
        to_block: u64,
        topic0: Option<B256>,
    ) -> Result<Vec<LogRecord>> {
        let mut filter = Filter::new()
            .address(address)
            .from_block(BlockNumberOrTag::Number(from_block))
            .to_block(BlockNumberOrTag::Number(to_block));
        if let Some(topic0) = topic0 {
            filter = filter.event_signature(topic0);
        }

        let logs = self.provider.get_logs(&filter).await.map_err(|e| {
            warn!(
                "Failed to get logs for blocks [{}, {}]. Error details:\n{:#?}",
                from_block, to_block, e
            );
            anyhow!("RPC error: {}", e)
        })?;

        logs.parse_log_records()
    }
}

pub trait LogParser {
    fn parse_log_records(self) -> Result<Vec<LogRecord>>;
}

impl LogParser for Vec<Log> {
    fn parse_log_records(self) -> Result<Vec<LogRecord>> {
        self.into_iter()
            .map(|log| {
                // Pending logs have no position yet and removed logs were reorged out
                if log.removed {
                    return Err(malformed(format!(
                        "log {:?}/{:?} was removed by a reorg",
                        log.transaction_hash, log.log_index
                    )));
                }
                let block_number = log
                    .block_number
                    .ok_or_else(|| malformed("missing blockNumber".to_string()))?;
                let transaction_hash = log
                    .transaction_hash
                    .ok_or_else(|| malformed("missing transactionHash".to_string()))?;
                let log_index = log
                    .log_index
                    .ok_or_else(|| malformed("missing logIndex".to_string()))?;

                let topics = log.inner.data.topics().to_vec();
                if topics.len() > MAX_TOPICS {
                    return Err(malformed(format!(
                        "log ({}, {}) has {} topics",
                        transaction_hash,
                        log_index,
                        topics.len()
                    )));
                }

                Ok(LogRecord {
                    block_number,
                    transaction_hash,
                    log_index,
                    address: log.inner.address,
                    data: log.inner.data.data,
                    topics,
                })
            })
            .collect()
    }
}

fn malformed(reason: String) -> anyhow::Error {
    MalformedLogError { reason }.into()
}
