//! Peer classification.

use commitsync_core::Uid;
use commitsync_ledger::Membership;

use crate::index::CommitmentIndex;

/// Uids that committed a bucket and hold at most `stake_threshold`.
///
/// Uids above the threshold are validators. Output is ascending; callers
/// should still treat it as a set.
pub fn classify_peers<M: Membership + ?Sized>(
    index: &CommitmentIndex,
    membership: &M,
    stake_threshold: f64,
) -> Vec<Uid> {
    index
        .keys()
        .copied()
        .filter(|uid| membership.stake(*uid) <= stake_threshold)
        .collect()
}
