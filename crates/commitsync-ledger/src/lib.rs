//! # Commitsync Ledger
//!
//! The external collaborators of the chain manager, expressed as traits:
//!
//! - [`Ledger`] - async RPC surface of the shared ledger
//! - [`Membership`] - slot/hotkey mapping and per-slot stake
//!
//! ## Implementations
//!
//! - [`MemoryLedger`] - In-memory ledger with block production and failure
//!   injection, for tests and local runs
//! - [`Metagraph`] / [`SharedMetagraph`] - Membership snapshots, the shared
//!   variant refreshed externally
//!
//! ## Usage
//!
//! ```rust,no_run
//! use commitsync_core::{BucketRecord, Keypair, NetUid, SignedCommitment, Uid};
//! use commitsync_ledger::{Ledger, MemoryLedger};
//!
//! async fn example() {
//!     let keypair = Keypair::generate();
//!     let ledger = MemoryLedger::new();
//!     ledger.register(NetUid(3), Uid(0), keypair.hotkey());
//!
//!     let record = BucketRecord::new("a".repeat(32), "b".repeat(32), "c".repeat(64));
//!     let signed = SignedCommitment::sign(&keypair, NetUid(3), Uid(0), &record).unwrap();
//!     ledger.submit_record(signed).await.unwrap();
//!
//!     let raw = ledger.read_record(NetUid(3), Uid(0)).await.unwrap();
//!     assert!(raw.is_some());
//! }
//! ```

pub mod error;
pub mod membership;
pub mod memory;
pub mod traits;

pub use error::{LedgerError, Result};
pub use membership::{Membership, Metagraph, Neuron, SharedMetagraph};
pub use memory::MemoryLedger;
pub use traits::{
    BlockHeader, BlockSubscription, CommitmentEnvelope, CommitmentField, Ledger, SubmitAck,
    RAW_FIELD_KIND,
};
