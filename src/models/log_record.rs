use alloy_primitives::{Address, Bytes, B256};
use serde::Serialize;

/// One emitted event, as returned by a log source and carried through the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub block_number: u64,
    pub transaction_hash: B256,
    pub log_index: u64,
    #[serde(skip)] // Only used for the window's address predicate
    pub address: Address,
    pub data: Bytes,
    pub topics: Vec<B256>,
}

impl LogRecord {
    /// Identity of a log: a log index is unique within its transaction.
    pub fn identity(&self) -> (B256, u64) {
        (self.transaction_hash, self.log_index)
    }

    pub fn topic0(&self) -> Option<&B256> {
        self.topics.first()
    }
}
