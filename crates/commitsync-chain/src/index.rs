//! Commitment index: decoding a bulk ledger read into `uid -> BucketRecord`.

use std::collections::BTreeMap;

use commitsync_core::{decode_wire, BucketRecord, Hotkey, Uid};
use commitsync_ledger::{CommitmentEnvelope, Membership};

/// Published bucket records keyed by slot.
pub type CommitmentIndex = BTreeMap<Uid, BucketRecord>;

/// Index and derived peer set, replaced together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitmentSnapshot {
    pub commitments: CommitmentIndex,
    /// Uids classified as peers, ascending.
    pub peers: Vec<Uid>,
}

/// What happened to the entries of one bulk read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexReport {
    /// Entries decoded into the index.
    pub decoded: usize,
    /// Entries whose hotkey is not in the membership view.
    pub unknown_hotkeys: usize,
    /// Entries without a usable first field.
    pub empty: usize,
    /// Entries whose payload failed to decode.
    pub malformed: usize,
}

/// Decode a bulk read into a fresh index.
///
/// Unknown hotkeys and empty envelopes are dropped silently; malformed
/// payloads are logged and skipped. One bad entry never aborts the batch.
pub fn build_index<M: Membership + ?Sized>(
    entries: Vec<(Hotkey, CommitmentEnvelope)>,
    membership: &M,
) -> (CommitmentIndex, IndexReport) {
    let mut index = CommitmentIndex::new();
    let mut report = IndexReport::default();

    for (hotkey, envelope) in entries {
        let Some(uid) = membership.uid_for_hotkey(&hotkey) else {
            report.unknown_hotkeys += 1;
            continue;
        };

        let Some(payload) = envelope.first_payload() else {
            report.empty += 1;
            continue;
        };

        match decode_wire(payload) {
            Ok(record) => {
                tracing::debug!(uid = %uid, "decoded bucket commitment");
                index.insert(uid, record);
                report.decoded += 1;
            }
            Err(e) => {
                tracing::error!(uid = %uid, error = %e, "failed to decode commitment");
                report.malformed += 1;
            }
        }
    }

    (index, report)
}
