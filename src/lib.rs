//! Deterministic snapshots of EVM contract event logs with a Keccak-256 commitment over the
//! canonical log sequence.

pub mod fetcher;
pub mod models;
pub mod snapshot;
pub mod utils;
