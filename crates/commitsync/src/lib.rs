//! # Commitsync
//!
//! Publish your own storage bucket credentials to a shared ledger, and keep
//! a local view of every other participant's.
//!
//! ## Overview
//!
//! - **Record codec**: a bucket is committed as one fixed-width 128-character
//!   string, hex-encoded on the wire.
//! - **Chain manager**: reconciles the local commitment, refreshes the index
//!   of everyone's commitments, classifies peers by stake, and tracks the
//!   block/window clock.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use commitsync::{start, Config, Keypair};
//! use commitsync::ledger::{MemoryLedger, Metagraph, SharedMetagraph};
//!
//! async fn example() -> commitsync::Result<()> {
//!     let config = Config::load("commitsync.json")?;
//!     let ledger = Arc::new(MemoryLedger::new());
//!     let metagraph = Arc::new(SharedMetagraph::new(Metagraph::new()));
//!
//!     let manager = start(&config, ledger, metagraph, Keypair::generate()).await?;
//!     for uid in manager.peers() {
//!         let _bucket = manager.bucket(uid);
//!     }
//!     manager.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `commitsync::core` - Records, codec, keys
//! - `commitsync::ledger` - Ledger and membership traits, in-memory ledger
//! - `commitsync::chain` - The chain manager

use std::sync::Arc;

pub mod config;
pub mod credentials;
pub mod error;

pub use commitsync_chain as chain;
pub use commitsync_core as core;
pub use commitsync_ledger as ledger;

pub use config::Config;
pub use credentials::{BucketCredentials, ReadCredentials};
pub use error::{Error, Result};

pub use commitsync_chain::{ChainConfig, ChainManager, Identity};
pub use commitsync_core::{BucketRecord, Hotkey, Keypair, NetUid, Uid};

/// Start a chain manager from `config`.
///
/// The local identity comes from `keypair` and the configured credentials
/// file; without a credentials file the manager only observes.
pub async fn start(
    config: &Config,
    ledger: Arc<dyn ledger::Ledger>,
    membership: Arc<dyn ledger::Membership>,
    keypair: Keypair,
) -> Result<ChainManager> {
    let identity = config.identity(keypair)?;
    tracing::info!(
        netuid = %config.chain.netuid,
        publishing = identity.is_some(),
        "starting chain manager"
    );
    let manager = ChainManager::start(config.chain.clone(), ledger, membership, identity).await?;
    Ok(manager)
}
