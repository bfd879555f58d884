use std::time::Duration;

use alloy_primitives::B256;
use thiserror::Error;

use crate::models::window::QueryWindow;

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Invalid block range: fromBlock {from_block} is greater than toBlock {to_block}")]
    InvalidRange { from_block: u64, to_block: u64 },
    #[error("Invalid topic0 filter: expected a 32-byte hex value, got {value:?}")]
    InvalidTopic0 { value: String },
    #[error("Invalid contract address: {value:?}")]
    InvalidAddress { value: String },
    #[error("Invalid block count: --blocks must be > 0")]
    InvalidBlockCount,
    #[error("Invalid RPC URL: {value:?}")]
    InvalidRpcUrl { value: String },
    #[error("Failed to load settings: {0}")]
    Settings(String),
}

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Log query failed for window {window}")]
    Query {
        window: QueryWindow,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("Malformed log returned for window {window}: {reason}")]
    MalformedLog { window: QueryWindow, reason: String },
    #[error("Log query for window {window} exceeded deadline of {deadline:?}")]
    Timeout {
        window: QueryWindow,
        deadline: Duration,
    },
}

impl RetrievalError {
    pub fn window(&self) -> &QueryWindow {
        match self {
            Self::Query { window, .. }
            | Self::MalformedLog { window, .. }
            | Self::Timeout { window, .. } => window,
        }
    }
}

/// Returned by a log source when a response cannot be turned into a complete record.
#[derive(Error, Debug)]
#[error("{reason}")]
pub struct MalformedLogError {
    pub reason: String,
}

/// Raised when a log cannot be represented in the fixed commitment encoding.
#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("Log ({transaction_hash}, {log_index}): field `{field}` is {len} bytes, exceeding the length prefix capacity")]
    FieldTooLarge {
        transaction_hash: B256,
        log_index: u64,
        field: &'static str,
        len: usize,
    },
    #[error("Log ({transaction_hash}, {log_index}): {count} topics, at most 4 are allowed")]
    TooManyTopics {
        transaction_hash: B256,
        log_index: u64,
        count: usize,
    },
}

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}
