//! # Commitsync Chain
//!
//! The chain manager: keeps a local view of every participant's published
//! bucket commitment in step with the ledger.
//!
//! ## Overview
//!
//! [`ChainManager`] owns three pieces of state and drives three activities:
//!
//! - **Commitment index**: `uid -> BucketRecord`, rebuilt wholesale by a
//!   periodic refresh. An empty or failed refresh keeps the previous index.
//! - **Peer set**: uids that committed a bucket and hold at most the stake
//!   threshold, re-derived whenever the index is replaced.
//! - **Chain clock**: latest block and the window derived from it, advanced
//!   by the optional block listener.
//!
//! Self-commitment reconciliation compares the local participant's published
//! record with its intended one and publishes only on mismatch.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use commitsync_chain::{ChainConfig, ChainManager, Identity};
//! use commitsync_core::{BucketRecord, Keypair};
//! use commitsync_ledger::{MemoryLedger, Metagraph, SharedMetagraph};
//!
//! async fn example() {
//!     let ledger = Arc::new(MemoryLedger::new());
//!     let metagraph = Arc::new(SharedMetagraph::new(Metagraph::new()));
//!     let identity = Identity::new(
//!         Keypair::generate(),
//!         BucketRecord::new("a".repeat(32), "b".repeat(32), "c".repeat(64)),
//!     );
//!
//!     let manager = ChainManager::start(ChainConfig::default(), ledger, metagraph, Some(identity))
//!         .await
//!         .unwrap();
//!     manager.spawn_block_listener().unwrap();
//!
//!     let _peers = manager.peers();
//!     manager.shutdown().await;
//! }
//! ```
//!
//! ## Activities
//!
//! ```text
//! start()
//!   |-- reconcile (once)          compare-and-publish own commitment
//!   |-- refresh (once, blocking)  populate index + peers
//!   `-- spawn refresh task        every refresh_interval, log-and-continue
//!
//! spawn_block_listener()          subscribe, update clock, retry on failure
//! shutdown()                      raise stop signal, join tasks
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod index;
pub mod listener;
pub mod manager;
pub mod peers;
pub mod reconcile;
pub mod refresh;
pub mod retry;

pub use clock::{BlockUpdate, ChainClock, ClockState};
pub use config::ChainConfig;
pub use error::{ChainError, Result};
pub use index::{build_index, CommitmentIndex, CommitmentSnapshot, IndexReport};
pub use manager::ChainManager;
pub use peers::classify_peers;
pub use reconcile::{reconcile, Identity, ReconcileOutcome};
pub use refresh::RefreshOutcome;
pub use retry::RetryState;
