use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::warn;

use crate::models::log_record::LogRecord;

/// Deduplicated, ordered and possibly capped log sequence with the figures derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalLogs {
    pub logs: Vec<LogRecord>,
    pub truncated: bool,
    /// Length of the deduplicated sequence before the cap was applied.
    pub total_before_cap: usize,
    pub from_block_effective: Option<u64>,
    pub to_block_effective: Option<u64>,
    pub unique_tx_count: usize,
}

/// Total order of the canonical sequence: `(block_number, transaction_hash, log_index)`.
///
/// Transaction hashes compare as 32-byte big-endian values, which is the same order as their
/// fixed-width lowercase hex strings.
pub fn canonical_order(a: &LogRecord, b: &LogRecord) -> Ordering {
    (a.block_number, a.transaction_hash, a.log_index).cmp(&(
        b.block_number,
        b.transaction_hash,
        b.log_index,
    ))
}

// Orders records sharing an identity so the kept duplicate does not depend on arrival order
fn identity_then_content(a: &LogRecord, b: &LogRecord) -> Ordering {
    a.identity()
        .cmp(&b.identity())
        .then_with(|| a.block_number.cmp(&b.block_number))
        .then_with(|| a.address.cmp(&b.address))
        .then_with(|| a.data.as_ref().cmp(b.data.as_ref()))
        .then_with(|| a.topics.cmp(&b.topics))
}

/// Produces the canonical sequence used for both display and commitment.
///
/// `max_logs` of 0 disables the cap; otherwise the first `max_logs` entries in canonical
/// order are kept.
pub fn canonicalize(mut records: Vec<LogRecord>, max_logs: usize) -> CanonicalLogs {
    records.sort_by(identity_then_content);
    records.dedup_by(|current, kept| {
        if current.identity() != kept.identity() {
            return false;
        }
        if current != kept {
            warn!(
                "Conflicting duplicates for log ({}, {}): keeping the lowest-ordered copy",
                kept.transaction_hash, kept.log_index
            );
        }
        true
    });

    records.sort_by(canonical_order);

    let total_before_cap = records.len();
    let truncated = max_logs > 0 && records.len() > max_logs;
    if truncated {
        warn!(
            "Truncating logs from {} to max_logs={} for commitment",
            total_before_cap, max_logs
        );
        records.truncate(max_logs);
    }

    let from_block_effective = records.first().map(|log| log.block_number);
    let to_block_effective = records.last().map(|log| log.block_number);
    let unique_tx_count = records
        .iter()
        .map(|log| log.transaction_hash)
        .collect::<HashSet<_>>()
        .len();

    CanonicalLogs {
        logs: records,
        truncated,
        total_before_cap,
        from_block_effective,
        to_block_effective,
        unique_tx_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, Bytes, B256};

    fn log(block_number: u64, tx: u8, log_index: u64) -> LogRecord {
        LogRecord {
            block_number,
            transaction_hash: B256::repeat_byte(tx),
            log_index,
            address: Address::ZERO,
            data: Bytes::from(vec![tx, log_index as u8]),
            topics: vec![B256::repeat_byte(0x01)],
        }
    }

    fn keys(canonical: &CanonicalLogs) -> Vec<(u64, u8, u64)> {
        canonical
            .logs
            .iter()
            .map(|l| (l.block_number, l.transaction_hash[0], l.log_index))
            .collect()
    }

    #[test]
    fn test_orders_by_block_tx_and_index() {
        let canonical = canonicalize(vec![log(100, 0xaa, 2), log(100, 0xaa, 0), log(99, 0xbb, 0)], 0);

        assert_eq!(keys(&canonical), vec![(99, 0xbb, 0), (100, 0xaa, 0), (100, 0xaa, 2)]);
        assert_eq!(canonical.from_block_effective, Some(99));
        assert_eq!(canonical.to_block_effective, Some(100));
        assert_eq!(canonical.unique_tx_count, 2);
        assert!(!canonical.truncated);
    }

    #[test]
    fn test_tx_hash_breaks_ties_within_block() {
        let canonical = canonicalize(vec![log(5, 0xbb, 0), log(5, 0x0a, 7), log(5, 0xaa, 1)], 0);
        assert_eq!(keys(&canonical), vec![(5, 0x0a, 7), (5, 0xaa, 1), (5, 0xbb, 0)]);
    }

    #[test]
    fn test_removes_duplicates() {
        let canonical = canonicalize(
            vec![log(1, 0xaa, 0), log(1, 0xaa, 0), log(1, 0xaa, 1), log(1, 0xaa, 0)],
            0,
        );
        assert_eq!(keys(&canonical), vec![(1, 0xaa, 0), (1, 0xaa, 1)]);
        assert_eq!(canonical.unique_tx_count, 1);
    }

    #[test]
    fn test_conflicting_duplicates_resolve_independently_of_arrival() {
        let mut first = log(10, 0xaa, 0);
        let mut second = log(10, 0xaa, 0);
        first.data = Bytes::from(vec![0x02]);
        second.data = Bytes::from(vec![0x01]);

        let forward = canonicalize(vec![first.clone(), second.clone()], 0);
        let backward = canonicalize(vec![second.clone(), first], 0);

        assert_eq!(forward, backward);
        assert_eq!(forward.logs, vec![second]);
    }

    #[test]
    fn test_truncation_keeps_lowest_entries() {
        let input = vec![log(3, 0x03, 0), log(1, 0x01, 0), log(2, 0x02, 0), log(2, 0x02, 1)];
        let full = canonicalize(input.clone(), 0);
        let capped = canonicalize(input, 2);

        assert!(capped.truncated);
        assert_eq!(capped.total_before_cap, 4);
        assert_eq!(capped.logs, full.logs[..2].to_vec());
        assert_eq!(capped.from_block_effective, Some(1));
        assert_eq!(capped.to_block_effective, Some(2));
        assert_eq!(capped.unique_tx_count, 2);
    }

    #[test]
    fn test_cap_at_exact_length_does_not_truncate() {
        let canonical = canonicalize(vec![log(1, 0x01, 0), log(2, 0x02, 0)], 2);
        assert!(!canonical.truncated);
        assert_eq!(canonical.logs.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        let canonical = canonicalize(Vec::new(), 10);
        assert!(canonical.logs.is_empty());
        assert_eq!(canonical.from_block_effective, None);
        assert_eq!(canonical.to_block_effective, None);
        assert_eq!(canonical.unique_tx_count, 0);
        assert!(!canonical.truncated);
    }

    #[test]
    fn test_order_is_independent_of_arrival() {
        let input = vec![
            log(7, 0x10, 1),
            log(3, 0x20, 0),
            log(7, 0x05, 4),
            log(3, 0x20, 2),
            log(9, 0x01, 0),
        ];
        let expected = canonicalize(input.clone(), 0);

        let mut rotated = input.clone();
        for _ in 0..input.len() {
            rotated.rotate_left(1);
            assert_eq!(canonicalize(rotated.clone(), 0), expected);
        }
        let mut reversed = input;
        reversed.reverse();
        assert_eq!(canonicalize(reversed, 0), expected);

        for pair in expected.logs.windows(2) {
            assert_ne!(canonical_order(&pair[0], &pair[1]), Ordering::Greater);
        }
    }
}
