use serde::Serialize;

use crate::models::log_record::LogRecord;

pub const SNAPSHOT_MODE: &str = "zk_bridge_events_snapshot";

////////////////////////////////////// Snapshot ////////////////////////////////////////
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMeta {
    pub from_block_requested: u64,
    pub to_block_requested: u64,
    // Serialized as null, never omitted: zero would read as "block 0 was seen"
    pub from_block_effective: Option<u64>,
    pub to_block_effective: Option<u64>,
    pub log_count: usize,
    pub unique_tx_count: usize,
    pub max_logs: usize,
    pub topic0_filter: Option<String>,
    pub elapsed_sec: f64,
    pub commitment_keccak: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub meta: SnapshotMeta,
    pub logs: Vec<LogRecord>,
}

/////////////////////////////////////// Payload ////////////////////////////////////////
// Wire envelope written to stdout
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPayload {
    pub mode: &'static str,
    pub network: Option<String>,
    pub chain_id: Option<u64>,
    pub bridge_address: String,
    pub generated_at_utc: String,
    pub data: Snapshot,
}
