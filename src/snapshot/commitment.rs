use alloy_primitives::{hex, keccak256, B256};

use crate::models::errors::EncodingError;
use crate::models::log_record::LogRecord;

const MAX_TOPICS: usize = 4;
const TOPIC_LEN: u32 = 32;

/// Encodes the canonical sequence into the byte layout the commitment hashes.
///
/// Per log, in sequence order:
///
/// | field              | layout                                          |
/// |--------------------|-------------------------------------------------|
/// | `block_number`     | u64, big-endian                                 |
/// | `transaction_hash` | 32 bytes                                        |
/// | `log_index`        | u64, big-endian                                 |
/// | `data`             | u32 big-endian length, then the bytes           |
/// | `topics`           | u32 big-endian count, then per topic a u32 big-endian length and the 32 bytes |
///
/// Logs are concatenated with no other framing. An empty sequence encodes to zero bytes.
pub fn encode_logs(logs: &[LogRecord]) -> Result<Vec<u8>, EncodingError> {
    let capacity = logs
        .iter()
        .map(|log| 8 + 32 + 8 + 4 + log.data.len() + 4 + log.topics.len() * (4 + 32))
        .sum();
    let mut buf = Vec::with_capacity(capacity);
    for log in logs {
        encode_log(log, &mut buf)?;
    }
    Ok(buf)
}

fn encode_log(log: &LogRecord, buf: &mut Vec<u8>) -> Result<(), EncodingError> {
    if log.topics.len() > MAX_TOPICS {
        return Err(EncodingError::TooManyTopics {
            transaction_hash: log.transaction_hash,
            log_index: log.log_index,
            count: log.topics.len(),
        });
    }
    let data_len = length_prefix(log, "data", log.data.len())?;

    buf.extend_from_slice(&log.block_number.to_be_bytes());
    buf.extend_from_slice(log.transaction_hash.as_slice());
    buf.extend_from_slice(&log.log_index.to_be_bytes());

    buf.extend_from_slice(&data_len.to_be_bytes());
    buf.extend_from_slice(&log.data);

    buf.extend_from_slice(&(log.topics.len() as u32).to_be_bytes());
    for topic in &log.topics {
        buf.extend_from_slice(&TOPIC_LEN.to_be_bytes());
        buf.extend_from_slice(topic.as_slice());
    }
    Ok(())
}

fn length_prefix(log: &LogRecord, field: &'static str, len: usize) -> Result<u32, EncodingError> {
    u32::try_from(len).map_err(|_| EncodingError::FieldTooLarge {
        transaction_hash: log.transaction_hash,
        log_index: log.log_index,
        field,
        len,
    })
}

/// Keccak-256 over [`encode_logs`].
pub fn compute_commitment(logs: &[LogRecord]) -> Result<B256, EncodingError> {
    Ok(keccak256(encode_logs(logs)?))
}

/// Renders a digest as `0x` followed by 64 lowercase hex characters.
pub fn format_commitment(digest: &B256) -> String {
    hex::encode_prefixed(digest)
}
