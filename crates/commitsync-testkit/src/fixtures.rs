//! Test fixtures and helpers.
//!
//! A [`TestNetwork`] is a memory ledger plus a shared metagraph, kept in
//! agreement about who holds which slot.

use std::sync::Arc;

use commitsync_chain::{ChainConfig, Identity};
use commitsync_core::{encode, BucketRecord, Keypair, NetUid, Uid};
use commitsync_ledger::{Ledger, MemoryLedger, Membership, Metagraph, SharedMetagraph};

/// Netuid used by fixtures.
pub const TEST_NETUID: NetUid = NetUid(3);

/// A record of correct widths whose fields are all `tag`.
pub fn bucket(tag: char) -> BucketRecord {
    let tag = tag.to_string();
    BucketRecord::new(tag.repeat(32), tag.repeat(32), tag.repeat(64))
}

/// An in-memory ledger and membership view for one netuid.
pub struct TestNetwork {
    pub netuid: NetUid,
    pub ledger: Arc<MemoryLedger>,
    pub metagraph: SharedMetagraph,
}

impl TestNetwork {
    pub fn new() -> Self {
        Self {
            netuid: TEST_NETUID,
            ledger: Arc::new(MemoryLedger::new()),
            metagraph: SharedMetagraph::default(),
        }
    }

    /// Register a participant at `uid` with a keypair derived from `seed`.
    pub fn join(&self, uid: Uid, seed: u8, stake: f64) -> Keypair {
        let keypair = Keypair::from_seed(&[seed; 32]);
        self.ledger.register(self.netuid, uid, keypair.hotkey());
        self.metagraph
            .update(|m| m.insert(uid, keypair.hotkey(), stake));
        keypair
    }

    /// Publish `record` for `keypair` directly, bypassing signing.
    pub fn commit(&self, keypair: &Keypair, record: &BucketRecord) {
        let plain = encode(record).expect("fixture record has valid widths");
        self.ledger.set_record(self.netuid, keypair.hotkey(), &plain);
    }

    /// Identity publishing `record` under `keypair`.
    pub fn identity(&self, keypair: &Keypair, record: BucketRecord) -> Identity {
        Identity::new(keypair.clone(), record)
    }

    /// Chain config for this network with a small window.
    pub fn config(&self) -> ChainConfig {
        ChainConfig {
            netuid: self.netuid,
            window_length: 10,
            ..ChainConfig::default()
        }
    }

    pub fn ledger(&self) -> Arc<dyn Ledger> {
        self.ledger.clone()
    }

    pub fn membership(&self) -> Arc<dyn Membership> {
        Arc::new(self.metagraph.clone())
    }

    pub fn snapshot(&self) -> Metagraph {
        self.metagraph.snapshot()
    }
}

impl Default for TestNetwork {
    fn default() -> Self {
        Self::new()
    }
}
