use std::fmt;

use alloy_primitives::{Address, B256};

use crate::models::errors::ConfigurationError;
use crate::models::log_record::LogRecord;

/// Block range and filter bounding a single snapshot computation.
///
/// Bounds are inclusive. A window is only built through [`QueryWindow::new`], which rejects
/// `from_block > to_block`; fields are private so a window cannot be widened after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryWindow {
    from_block: u64,
    to_block: u64,
    address: Address,
    topic0: Option<B256>,
}

impl QueryWindow {
    pub fn new(
        address: Address,
        from_block: u64,
        to_block: u64,
        topic0: Option<B256>,
    ) -> Result<Self, ConfigurationError> {
        if from_block > to_block {
            return Err(ConfigurationError::InvalidRange {
                from_block,
                to_block,
            });
        }
        Ok(Self {
            from_block,
            to_block,
            address,
            topic0,
        })
    }

    pub fn from_block(&self) -> u64 {
        self.from_block
    }

    pub fn to_block(&self) -> u64 {
        self.to_block
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn topic0(&self) -> Option<B256> {
        self.topic0
    }

    /// Number of blocks covered by the window.
    pub fn block_count(&self) -> u64 {
        (self.to_block - self.from_block).saturating_add(1)
    }

    /// Splits the window into consecutive sub-windows of at most `max_range` blocks each.
    /// A `max_range` of 0 yields the window itself.
    pub fn split(&self, max_range: u64) -> Vec<QueryWindow> {
        if max_range == 0 || self.block_count() <= max_range {
            return vec![self.clone()];
        }

        let mut chunks = Vec::new();
        let mut start = self.from_block;
        loop {
            let end = start.saturating_add(max_range - 1).min(self.to_block);
            chunks.push(QueryWindow {
                from_block: start,
                to_block: end,
                address: self.address,
                topic0: self.topic0,
            });
            if end == self.to_block {
                break;
            }
            start = end + 1;
        }
        chunks
    }

    /// Whether a record satisfies the block range, address and topic0 predicates.
    pub fn matches(&self, record: &LogRecord) -> bool {
        if record.block_number < self.from_block || record.block_number > self.to_block {
            return false;
        }
        if record.address != self.address {
            return false;
        }
        match self.topic0 {
            Some(topic0) => record.topics.first() == Some(&topic0),
            None => true,
        }
    }
}

impl fmt::Display for QueryWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}] address={}",
            self.from_block, self.to_block, self.address
        )?;
        if let Some(topic0) = self.topic0 {
            write!(f, " topic0={topic0}")?;
        }
        Ok(())
    }
}
