pub mod assemble;
pub mod canonicalize;
pub mod commitment;

use tracing::info;

use crate::fetcher::{LogFetcher, LogSource};
use crate::models::errors::SnapshotError;
use crate::models::snapshot::Snapshot;
use crate::models::window::QueryWindow;
use crate::snapshot::assemble::assemble_snapshot;
use crate::snapshot::canonicalize::canonicalize;
use crate::snapshot::commitment::{compute_commitment, format_commitment};

/// Runs Fetch -> Canonicalize -> Commit -> Assemble for one window.
///
/// Any failure aborts the run; no snapshot is produced from a partial fetch.
pub async fn run_snapshot<S: LogSource>(
    fetcher: &LogFetcher<S>,
    window: &QueryWindow,
    max_logs: usize,
) -> Result<Snapshot, SnapshotError> {
    let fetched = fetcher.fetch(window).await?;

    let canonical = canonicalize(fetched.records, max_logs);
    info!(
        "Canonical sequence: {} logs across {} transactions{}",
        canonical.logs.len(),
        canonical.unique_tx_count,
        if canonical.truncated { " (truncated)" } else { "" }
    );

    let commitment = compute_commitment(&canonical.logs)?;
    info!("Commitment: {}", format_commitment(&commitment));

    Ok(assemble_snapshot(
        window,
        canonical,
        &commitment,
        fetched.elapsed,
        max_logs,
    ))
}
