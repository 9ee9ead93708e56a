//! Commitment refresh: one-shot fetch and the periodic background task.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};

use commitsync_core::{NetUid, Uid};
use commitsync_ledger::{Ledger, Membership};

use crate::error::Result;
use crate::index::{build_index, CommitmentIndex, IndexReport};
use crate::manager::Shared;

/// Result of one refresh pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The index was replaced with `count` records.
    Replaced { count: usize, peers: Vec<Uid> },
    /// Nothing decodable was read; the previous index was kept.
    Empty,
    /// A pass that started later installed its result first; this one was
    /// discarded.
    Superseded,
}

/// Read and decode every commitment in `netuid`, at `block` or the latest.
pub(crate) async fn fetch_index(
    ledger: &dyn Ledger,
    membership: &dyn Membership,
    netuid: NetUid,
    block: Option<u64>,
) -> Result<(CommitmentIndex, IndexReport)> {
    let at = match block {
        Some(number) => Some(ledger.block_hash(number).await?),
        None => None,
    };
    let entries = ledger.read_all_records(netuid, at).await?;
    Ok(build_index(entries, membership))
}

/// Refresh every `refresh_interval` until the stop signal is raised.
///
/// The first tick is one full period after start; the synchronous startup
/// refresh covers time zero. Failures are logged and the next tick proceeds.
pub(crate) async fn run_refresh_loop(shared: Arc<Shared>, mut stop: watch::Receiver<bool>) {
    let period = shared.config.refresh_interval();
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::debug!(period_secs = period.as_secs(), "refresh task started");

    loop {
        tokio::select! {
            _ = stopped(&mut stop) => break,
            _ = ticker.tick() => {
                match shared.refresh().await {
                    Ok(RefreshOutcome::Replaced { count, peers }) => {
                        tracing::debug!(count, peers = peers.len(), "scheduled refresh complete");
                    }
                    Ok(RefreshOutcome::Empty) => {
                        tracing::debug!("scheduled refresh read nothing, index kept");
                    }
                    Ok(RefreshOutcome::Superseded) => {
                        tracing::debug!("scheduled refresh superseded");
                    }
                    Err(e) => tracing::warn!(error = %e, "scheduled refresh failed"),
                }
            }
        }
    }

    tracing::debug!("refresh task stopped");
}

/// Resolves once the stop flag is raised or its sender is gone.
pub(crate) async fn stopped(stop: &mut watch::Receiver<bool>) {
    let _ = stop.wait_for(|stop| *stop).await;
}
