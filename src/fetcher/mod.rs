pub mod rpc;

use alloy_primitives::{Address, B256};
use anyhow::Result;
use futures::{StreamExt, TryStreamExt, stream};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::models::common::Settings;
use crate::models::errors::{MalformedLogError, RetrievalError};
use crate::models::log_record::LogRecord;
use crate::models::window::QueryWindow;
use crate::utils::retry::{RetryConfig, retry};

/// Range query capability over an external log store.
///
/// Implementations return every log emitted by `address` in `[from_block, to_block]` whose
/// first topic equals `topic0` when one is given. Responses that cannot be represented as a
/// [`LogRecord`] should fail with [`MalformedLogError`].
pub trait LogSource: Send + Sync {
    fn query(
        &self,
        address: Address,
        from_block: u64,
        to_block: u64,
        topic0: Option<B256>,
    ) -> impl Future<Output = Result<Vec<LogRecord>>> + Send;
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Largest block span per query. 0 issues a single query for the whole window.
    pub max_block_range: u64,
    /// Sub-range queries allowed in flight at once.
    pub concurrency: usize,
    pub retry: RetryConfig,
    /// Bound on the whole fetch, retries included.
    pub deadline: Option<Duration>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_block_range: 0,
            concurrency: 4,
            retry: RetryConfig::default(),
            deadline: None,
        }
    }
}

impl From<&Settings> for FetchConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            max_block_range: settings.max_block_range,
            concurrency: settings.concurrency.max(1),
            retry: RetryConfig::from(&settings.retry),
            deadline: (settings.deadline_secs > 0)
                .then(|| Duration::from_secs(settings.deadline_secs)),
        }
    }
}

#[derive(Debug)]
pub struct FetchOutcome {
    pub records: Vec<LogRecord>,
    pub elapsed: Duration,
}

pub struct LogFetcher<S> {
    source: S,
    config: FetchConfig,
}

impl<S: LogSource> LogFetcher<S> {
    pub fn new(source: S, config: FetchConfig) -> Self {
        Self { source, config }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetches the complete record set for `window`, or fails without returning anything.
    ///
    /// Records come back in arrival order; ordering is left to canonicalization.
    pub async fn fetch(&self, window: &QueryWindow) -> Result<FetchOutcome, RetrievalError> {
        let start = Instant::now();

        let records = match self.config.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.fetch_all(window))
                .await
                .map_err(|_| RetrievalError::Timeout {
                    window: window.clone(),
                    deadline,
                })??,
            None => self.fetch_all(window).await?,
        };

        let elapsed = start.elapsed();
        info!(
            "Log source returned {} logs in {:.2}s",
            records.len(),
            elapsed.as_secs_f64()
        );

        Ok(FetchOutcome { records, elapsed })
    }

    async fn fetch_all(&self, window: &QueryWindow) -> Result<Vec<LogRecord>, RetrievalError> {
        let chunks = window.split(self.config.max_block_range);
        info!(
            "Fetching logs for {} in {} quer{}",
            window,
            chunks.len(),
            if chunks.len() == 1 { "y" } else { "ies" }
        );

        let batches: Vec<Vec<LogRecord>> = stream::iter(chunks.iter())
            .map(|chunk| self.fetch_range(window, chunk))
            .buffer_unordered(self.config.concurrency.max(1))
            .try_collect()
            .await?;

        let mut records = Vec::with_capacity(batches.iter().map(Vec::len).sum());
        let mut discarded = 0usize;
        for record in batches.into_iter().flatten() {
            if window.matches(&record) {
                records.push(record);
            } else {
                discarded += 1;
            }
        }
        if discarded > 0 {
            debug!(
                "Discarded {} logs outside window {} returned by the source",
                discarded, window
            );
        }

        Ok(records)
    }

    async fn fetch_range(
        &self,
        window: &QueryWindow,
        chunk: &QueryWindow,
    ) -> Result<Vec<LogRecord>, RetrievalError> {
        let context = format!("get_logs [{}, {}]", chunk.from_block(), chunk.to_block());
        let source = &self.source;

        let result = retry(
            move || {
                source.query(
                    chunk.address(),
                    chunk.from_block(),
                    chunk.to_block(),
                    chunk.topic0(),
                )
            },
            &self.config.retry,
            &context,
        )
        .await;

        result.map_err(|e| match e.downcast_ref::<MalformedLogError>() {
            Some(malformed) => RetrievalError::MalformedLog {
                window: window.clone(),
                reason: format!(
                    "{} (blocks [{}, {}])",
                    malformed.reason,
                    chunk.from_block(),
                    chunk.to_block()
                ),
            },
            None => RetrievalError::Query {
                window: window.clone(),
                source: e.context(context).into(),
            },
        })
    }
}
