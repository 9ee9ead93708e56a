//! Ledger trait: the RPC surface the chain manager depends on.
//!
//! The trait is deliberately narrow. Connection management, submission
//! retries, and fee handling belong to implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use commitsync_core::{BlockHash, Hotkey, NetUid, SignedCommitment, Uid};

use crate::error::Result;

/// Field kind under which a fixed-width commitment is stored.
pub const RAW_FIELD_KIND: &str = "Raw128";

/// Header of a newly produced block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub number: u64,
    pub hash: BlockHash,
}

/// Stream of block headers from a subscription.
///
/// The subscription has ended when the receiver yields `None`.
pub type BlockSubscription = mpsc::Receiver<BlockHeader>;

/// Acknowledgement of an accepted submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitAck {
    /// Block the commitment was included at.
    pub block: u64,
}

/// One entry of a commitment's field list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitmentField {
    /// A typed entry, e.g. `Raw128`, carrying its wire value.
    Typed { kind: String, value: String },
    /// An entry whose shape the client could not interpret.
    Opaque,
}

/// The envelope a commitment is stored in on the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentEnvelope {
    pub fields: Vec<CommitmentField>,
}

impl CommitmentEnvelope {
    /// Envelope holding a single typed field.
    pub fn single(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            fields: vec![CommitmentField::Typed {
                kind: kind.into(),
                value: value.into(),
            }],
        }
    }

    /// Wire value of the first field, if that field is typed.
    pub fn first_payload(&self) -> Option<&str> {
        match self.fields.first()? {
            CommitmentField::Typed { value, .. } => Some(value.as_str()),
            CommitmentField::Opaque => None,
        }
    }
}

/// The ledger as seen by the chain manager.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Read the plain commitment text for one slot at the latest block.
    ///
    /// Returns `None` if the slot has never committed.
    async fn read_record(&self, netuid: NetUid, uid: Uid) -> Result<Option<String>>;

    /// Enumerate every commitment in a namespace.
    ///
    /// Reads at `at` when given, otherwise at the latest block. Order is
    /// unspecified.
    async fn read_all_records(
        &self,
        netuid: NetUid,
        at: Option<BlockHash>,
    ) -> Result<Vec<(Hotkey, CommitmentEnvelope)>>;

    /// Publish a signed commitment.
    async fn submit_record(&self, commitment: SignedCommitment) -> Result<SubmitAck>;

    /// Hash of the block at `number`.
    async fn block_hash(&self, number: u64) -> Result<BlockHash>;

    /// Header of the latest block.
    async fn latest_block(&self) -> Result<BlockHeader>;

    /// Subscribe to headers of new blocks as they are produced.
    async fn subscribe_new_blocks(&self) -> Result<BlockSubscription>;
}
