//! Signed commitments submitted to the ledger.

use crate::bucket::BucketRecord;
use crate::codec;
use crate::crypto::{Hotkey, Keypair, Signature};
use crate::error::{CoreError, EncodeError};
use crate::types::{NetUid, Uid};

/// Domain tag prepended to every signed commitment message.
pub const COMMIT_DOMAIN: &[u8] = b"commitsync-commit-v0:";

/// An encoded record, bound to a namespace and slot, signed by its publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedCommitment {
    pub netuid: NetUid,
    pub uid: Uid,
    /// The plain 128-character commitment.
    pub payload: String,
    pub signer: Hotkey,
    pub signature: Signature,
}

impl SignedCommitment {
    /// Encode `record` and sign it for `(netuid, uid)`.
    pub fn sign(
        keypair: &Keypair,
        netuid: NetUid,
        uid: Uid,
        record: &BucketRecord,
    ) -> Result<Self, EncodeError> {
        let payload = codec::encode(record)?;
        let signature = keypair.sign(&signing_message(netuid, uid, &payload));
        Ok(Self {
            netuid,
            uid,
            payload,
            signer: keypair.hotkey(),
            signature,
        })
    }

    /// Check the signature against the embedded signer.
    pub fn verify(&self) -> Result<(), CoreError> {
        let message = signing_message(self.netuid, self.uid, &self.payload);
        self.signer.verify(&message, &self.signature)
    }
}

/// COMMIT_DOMAIN || netuid (BE) || uid (BE) || payload
fn signing_message(netuid: NetUid, uid: Uid, payload: &str) -> Vec<u8> {
    let mut msg = Vec::with_capacity(COMMIT_DOMAIN.len() + 4 + payload.len());
    msg.extend_from_slice(COMMIT_DOMAIN);
    msg.extend_from_slice(&netuid.0.to_be_bytes());
    msg.extend_from_slice(&uid.0.to_be_bytes());
    msg.extend_from_slice(payload.as_bytes());
    msg
}
