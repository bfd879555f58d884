use std::time::Duration;

use alloy_primitives::{hex, Address, B256};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::models::common::ChainInfo;
use crate::models::snapshot::{Snapshot, SnapshotMeta, SnapshotPayload, SNAPSHOT_MODE};
use crate::models::window::QueryWindow;
use crate::snapshot::canonicalize::CanonicalLogs;
use crate::snapshot::commitment::format_commitment;

pub fn assemble_snapshot(
    window: &QueryWindow,
    canonical: CanonicalLogs,
    commitment: &B256,
    elapsed: Duration,
    max_logs: usize,
) -> Snapshot {
    let meta = SnapshotMeta {
        from_block_requested: window.from_block(),
        to_block_requested: window.to_block(),
        from_block_effective: canonical.from_block_effective,
        to_block_effective: canonical.to_block_effective,
        log_count: canonical.logs.len(),
        unique_tx_count: canonical.unique_tx_count,
        max_logs,
        topic0_filter: window.topic0().map(hex::encode_prefixed),
        elapsed_sec: round_millis(elapsed),
        commitment_keccak: format_commitment(commitment),
    };

    Snapshot {
        meta,
        logs: canonical.logs,
    }
}

/// Wraps a snapshot in the output envelope.
pub fn assemble_payload(
    snapshot: Snapshot,
    chain: ChainInfo,
    bridge_address: Address,
    generated_at: DateTime<Utc>,
) -> SnapshotPayload {
    SnapshotPayload {
        mode: SNAPSHOT_MODE,
        network: chain.network,
        chain_id: chain.chain_id,
        bridge_address: bridge_address.to_checksum(None),
        generated_at_utc: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        data: snapshot,
    }
}

fn round_millis(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::canonicalize::canonicalize;
    use crate::snapshot::commitment::compute_commitment;
    use alloy_primitives::{address, Bytes};
    use chrono::TimeZone;
    use serde_json::json;

    const BRIDGE: Address = address!("0x3154Cf16ccdb4C6d922629664174b904d80F2C35");

    #[test]
    fn test_empty_snapshot_keeps_null_bounds() {
        let window = QueryWindow::new(BRIDGE, 0, 10, None).unwrap();
        let canonical = canonicalize(Vec::new(), 5000);
        let commitment = compute_commitment(&canonical.logs).unwrap();
        let snapshot = assemble_snapshot(&window, canonical, &commitment, Duration::from_millis(1234), 5000);

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(
            value["meta"],
            json!({
                "fromBlockRequested": 0,
                "toBlockRequested": 10,
                "fromBlockEffective": null,
                "toBlockEffective": null,
                "logCount": 0,
                "uniqueTxCount": 0,
                "maxLogs": 5000,
                "topic0Filter": null,
                "elapsedSec": 1.234,
                "commitmentKeccak": "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
            })
        );
        assert_eq!(value["logs"], json!([]));
    }

    #[test]
    fn test_payload_envelope() {
        let topic0 = B256::repeat_byte(0xab);
        let window = QueryWindow::new(BRIDGE, 5, 6, Some(topic0)).unwrap();
        let log = crate::models::log_record::LogRecord {
            block_number: 6,
            transaction_hash: B256::repeat_byte(0x01),
            log_index: 2,
            address: BRIDGE,
            data: Bytes::from(vec![0x0a, 0x0b]),
            topics: vec![topic0],
        };
        let canonical = canonicalize(vec![log], 0);
        let commitment = compute_commitment(&canonical.logs).unwrap();
        let snapshot = assemble_snapshot(&window, canonical, &commitment, Duration::ZERO, 0);
        let generated_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();

        let payload = assemble_payload(snapshot, ChainInfo::from_chain_id(1), BRIDGE, generated_at);
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["mode"], "zk_bridge_events_snapshot");
        assert_eq!(value["network"], "Ethereum Mainnet");
        assert_eq!(value["chainId"], 1);
        assert_eq!(value["bridgeAddress"], "0x3154Cf16ccdb4C6d922629664174b904d80F2C35");
        assert_eq!(value["generatedAtUtc"], "2024-05-01T12:30:00Z");
        assert_eq!(value["data"]["meta"]["topic0Filter"], hex::encode_prefixed(topic0));
        assert_eq!(value["data"]["meta"]["fromBlockEffective"], 6);
        assert_eq!(
            value["data"]["logs"][0],
            json!({
                "blockNumber": 6,
                "transactionHash": hex::encode_prefixed(B256::repeat_byte(0x01)),
                "logIndex": 2,
                "data": "0x0a0b",
                "topics": [hex::encode_prefixed(topic0)]
            })
        );
    }

    #[test]
    fn test_unknown_chain_serializes_nulls() {
        let window = QueryWindow::new(BRIDGE, 1, 1, None).unwrap();
        let canonical = canonicalize(Vec::new(), 0);
        let commitment = compute_commitment(&canonical.logs).unwrap();
        let snapshot = assemble_snapshot(&window, canonical, &commitment, Duration::ZERO, 0);
        let payload = assemble_payload(snapshot, ChainInfo::default(), BRIDGE, Utc::now());

        let value = serde_json::to_value(&payload).unwrap();
        assert!(value["network"].is_null());
        assert!(value["chainId"].is_null());
    }
}
