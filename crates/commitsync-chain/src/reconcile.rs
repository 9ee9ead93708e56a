//! Self-commitment reconciliation.
//!
//! Compares the record the local participant has published with the one it
//! intends to publish, and submits only when they differ. Running it twice
//! against an unchanged ledger submits at most once.

use commitsync_core::{decode, BucketRecord, Hotkey, Keypair, NetUid, SignedCommitment, Uid};
use commitsync_ledger::{Ledger, LedgerError, Membership};

use crate::error::{ChainError, Result};

/// The local participant: its signing key and the bucket it should publish.
#[derive(Debug, Clone)]
pub struct Identity {
    pub keypair: Keypair,
    pub bucket: BucketRecord,
}

impl Identity {
    pub fn new(keypair: Keypair, bucket: BucketRecord) -> Self {
        Self { keypair, bucket }
    }

    pub fn hotkey(&self) -> Hotkey {
        self.keypair.hotkey()
    }
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The published record already matches.
    Unchanged { uid: Uid },
    /// A new record was submitted and accepted.
    Published { uid: Uid, block: u64 },
    /// The submission failed. Not retried here.
    PublishFailed { uid: Uid, error: LedgerError },
}

impl ReconcileOutcome {
    pub fn uid(&self) -> Uid {
        match self {
            Self::Unchanged { uid } | Self::Published { uid, .. } | Self::PublishFailed { uid, .. } => {
                *uid
            }
        }
    }

    /// Whether a submission was attempted.
    pub fn submitted(&self) -> bool {
        !matches!(self, Self::Unchanged { .. })
    }
}

/// Compare-and-publish the local participant's commitment.
///
/// Fails with [`ChainError::IdentityNotFound`] if the hotkey holds no slot.
/// A failed read or an undecodable published record counts as a mismatch.
pub async fn reconcile(
    ledger: &dyn Ledger,
    membership: &dyn Membership,
    netuid: NetUid,
    identity: &Identity,
) -> Result<ReconcileOutcome> {
    let hotkey = identity.hotkey();
    let uid = membership
        .uid_for_hotkey(&hotkey)
        .ok_or(ChainError::IdentityNotFound(hotkey))?;

    match read_published(ledger, netuid, uid).await {
        Some(current) if current.same_commitment(&identity.bucket) => {
            tracing::debug!(uid = %uid, "published commitment is current");
            return Ok(ReconcileOutcome::Unchanged { uid });
        }
        Some(_) => tracing::info!(uid = %uid, "published commitment differs, republishing"),
        None => tracing::info!(uid = %uid, "no usable published commitment, publishing"),
    }

    let commitment = SignedCommitment::sign(&identity.keypair, netuid, uid, &identity.bucket)?;

    match ledger.submit_record(commitment).await {
        Ok(ack) => {
            tracing::info!(uid = %uid, block = ack.block, "commitment published");
            Ok(ReconcileOutcome::Published {
                uid,
                block: ack.block,
            })
        }
        Err(error) => {
            tracing::error!(uid = %uid, error = %error, "failed to publish commitment");
            Ok(ReconcileOutcome::PublishFailed { uid, error })
        }
    }
}

async fn read_published(ledger: &dyn Ledger, netuid: NetUid, uid: Uid) -> Option<BucketRecord> {
    let text = match ledger.read_record(netuid, uid).await {
        Ok(text) => text?,
        Err(e) => {
            tracing::warn!(uid = %uid, error = %e, "failed to read published commitment");
            return None;
        }
    };

    match decode(&text) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!(uid = %uid, error = %e, "published commitment is malformed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commitsync_core::encode;
    use commitsync_ledger::{MemoryLedger, Metagraph};

    const NET: NetUid = NetUid(3);

    fn bucket(secret: char) -> BucketRecord {
        BucketRecord::new("A".repeat(32), "K".repeat(32), secret.to_string().repeat(64))
    }

    fn setup(uid: Uid) -> (MemoryLedger, Metagraph, Keypair) {
        let keypair = Keypair::from_seed(&[7; 32]);
        let ledger = MemoryLedger::new();
        ledger.register(NET, uid, keypair.hotkey());
        let metagraph = Metagraph::new().with_neuron(uid, keypair.hotkey(), 0.0);
        (ledger, metagraph, keypair)
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent() {
        let (ledger, metagraph, keypair) = setup(Uid(5));
        let identity = Identity::new(keypair, bucket('1'));

        let first = reconcile(&ledger, &metagraph, NET, &identity).await.unwrap();
        assert!(matches!(first, ReconcileOutcome::Published { .. }));

        let second = reconcile(&ledger, &metagraph, NET, &identity).await.unwrap();
        assert_eq!(second, ReconcileOutcome::Unchanged { uid: Uid(5) });
        assert_eq!(ledger.submission_count(), 1);
    }

    #[tokio::test]
    async fn test_mismatched_secret_republishes() {
        let (ledger, metagraph, keypair) = setup(Uid(2));
        ledger.set_record(NET, keypair.hotkey(), &encode(&bucket('1')).unwrap());

        let identity = Identity::new(keypair, bucket('2'));
        let outcome = reconcile(&ledger, &metagraph, NET, &identity).await.unwrap();

        assert!(outcome.submitted());
        let submissions = ledger.submissions();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].payload, encode(&bucket('2')).unwrap());
    }

    #[tokio::test]
    async fn test_matching_record_not_resubmitted() {
        let (ledger, metagraph, keypair) = setup(Uid(2));
        ledger.set_record(NET, keypair.hotkey(), &encode(&bucket('1')).unwrap());

        let identity = Identity::new(keypair, bucket('1'));
        let outcome = reconcile(&ledger, &metagraph, NET, &identity).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::Unchanged { uid: Uid(2) });
        assert_eq!(ledger.submission_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_published_record_is_replaced() {
        let (ledger, metagraph, keypair) = setup(Uid(1));
        ledger.set_record(NET, keypair.hotkey(), "too short");

        let identity = Identity::new(keypair, bucket('1'));
        let outcome = reconcile(&ledger, &metagraph, NET, &identity).await.unwrap();
        assert!(matches!(outcome, ReconcileOutcome::Published { uid: Uid(1), .. }));
    }

    #[tokio::test]
    async fn test_unregistered_identity() {
        let ledger = MemoryLedger::new();
        let identity = Identity::new(Keypair::from_seed(&[1; 32]), bucket('1'));

        let err = reconcile(&ledger, &Metagraph::new(), NET, &identity)
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::IdentityNotFound(h) if h == identity.hotkey()));
        assert_eq!(ledger.submission_count(), 0);
    }

    #[tokio::test]
    async fn test_rejected_submission_reported() {
        let (ledger, metagraph, keypair) = setup(Uid(4));
        ledger.set_reject_submissions(true);

        let identity = Identity::new(keypair, bucket('1'));
        let outcome = reconcile(&ledger, &metagraph, NET, &identity).await.unwrap();
        assert!(matches!(
            outcome,
            ReconcileOutcome::PublishFailed {
                error: LedgerError::Rejected(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_bad_width_bucket_is_encode_error() {
        let (ledger, metagraph, keypair) = setup(Uid(4));
        let identity = Identity::new(keypair, BucketRecord::new("short", "K".repeat(32), "S".repeat(64)));

        let err = reconcile(&ledger, &metagraph, NET, &identity).await.unwrap_err();
        assert!(matches!(err, ChainError::Encode(_)));
    }
}
