//! In-memory implementation of the Ledger trait.
//!
//! Keeps commitment history per block so reads at a past block behave like a
//! real archive node. Block production is manual. Outages, rejected
//! submissions, and failing subscriptions can be switched on to exercise
//! the chain manager's recovery paths.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tokio::sync::mpsc::{self, error::TrySendError};

use commitsync_core::{BlockHash, Hotkey, NetUid, SignedCommitment, Uid};

use crate::error::{LedgerError, Result};
use crate::traits::{
    BlockHeader, BlockSubscription, CommitmentEnvelope, Ledger, SubmitAck, RAW_FIELD_KIND,
};

/// Buffered headers per subscriber before new ones are dropped.
const SUBSCRIPTION_BUFFER: usize = 256;

/// In-memory ledger.
///
/// Thread-safe via RwLock; no lock is held across an await point.
pub struct MemoryLedger {
    inner: RwLock<MemoryLedgerInner>,
}

#[derive(Default)]
struct MemoryLedgerInner {
    /// Latest block number.
    head: u64,

    /// Slot ownership: (netuid, uid) -> hotkey.
    registrations: HashMap<(NetUid, Uid), Hotkey>,

    /// Commitment history: netuid -> hotkey -> [(block, envelope)], ascending.
    commitments: HashMap<NetUid, BTreeMap<Hotkey, Vec<(u64, CommitmentEnvelope)>>>,

    /// Open block subscriptions.
    subscribers: Vec<mpsc::Sender<BlockHeader>>,

    /// Every accepted submission, in order.
    submissions: Vec<SignedCommitment>,

    offline: bool,
    reject_submissions: bool,
    subscribe_failures: u32,
    subscribe_attempts: u32,
}

impl MemoryLedger {
    /// Create an empty ledger at block 0.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryLedgerInner::default()),
        }
    }

    /// Create an empty ledger whose head is `head`.
    pub fn with_head(head: u64) -> Self {
        let ledger = Self::new();
        ledger.write().head = head;
        ledger
    }

    fn read(&self) -> RwLockReadGuard<'_, MemoryLedgerInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemoryLedgerInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deterministic hash of block `number`.
    pub fn hash_for(number: u64) -> BlockHash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"commitsync-block:");
        hasher.update(&number.to_be_bytes());
        BlockHash(*hasher.finalize().as_bytes())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Setup
    // ─────────────────────────────────────────────────────────────────────────

    /// Register `hotkey` as the owner of `uid`.
    pub fn register(&self, netuid: NetUid, uid: Uid, hotkey: Hotkey) {
        self.write().registrations.insert((netuid, uid), hotkey);
    }

    /// Store an envelope for `hotkey` at the current head.
    pub fn set_envelope(&self, netuid: NetUid, hotkey: Hotkey, envelope: CommitmentEnvelope) {
        let mut inner = self.write();
        let head = inner.head;
        inner
            .commitments
            .entry(netuid)
            .or_default()
            .entry(hotkey)
            .or_default()
            .push((head, envelope));
    }

    /// Store a plain commitment for `hotkey`, hex-encoded as the chain does.
    pub fn set_record(&self, netuid: NetUid, hotkey: Hotkey, plain: &str) {
        let wire = format!("0x{}", hex::encode(plain.as_bytes()));
        self.set_envelope(netuid, hotkey, CommitmentEnvelope::single(RAW_FIELD_KIND, wire));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Block production
    // ─────────────────────────────────────────────────────────────────────────

    /// Produce one block and notify subscribers.
    pub fn produce_block(&self) -> BlockHeader {
        let mut inner = self.write();
        inner.head += 1;
        let header = BlockHeader {
            number: inner.head,
            hash: Self::hash_for(inner.head),
        };

        inner.subscribers.retain(|tx| match tx.try_send(header) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!(block = header.number, "subscriber lagging, header dropped");
                true
            }
            Err(TrySendError::Closed(_)) => false,
        });

        header
    }

    /// Produce blocks until the head reaches `number`.
    pub fn advance_to(&self, number: u64) -> Option<BlockHeader> {
        let mut last = None;
        while self.head() < number {
            last = Some(self.produce_block());
        }
        last
    }

    pub fn head(&self) -> u64 {
        self.read().head
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Failure injection
    // ─────────────────────────────────────────────────────────────────────────

    /// While offline every RPC fails with `Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.write().offline = offline;
    }

    /// Reject every submission with `Rejected`.
    pub fn set_reject_submissions(&self, reject: bool) {
        self.write().reject_submissions = reject;
    }

    /// Fail the next `count` subscription attempts.
    pub fn fail_next_subscriptions(&self, count: u32) {
        self.write().subscribe_failures = count;
    }

    /// Drop every open subscription, ending their streams.
    pub fn close_subscriptions(&self) {
        self.write().subscribers.clear();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Inspection
    // ─────────────────────────────────────────────────────────────────────────

    pub fn submissions(&self) -> Vec<SignedCommitment> {
        self.read().submissions.clone()
    }

    pub fn submission_count(&self) -> usize {
        self.read().submissions.len()
    }

    pub fn subscribe_attempts(&self) -> u32 {
        self.read().subscribe_attempts
    }

    pub fn subscriber_count(&self) -> usize {
        self.read()
            .subscribers
            .iter()
            .filter(|tx| !tx.is_closed())
            .count()
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLedgerInner {
    fn ensure_online(&self) -> Result<()> {
        if self.offline {
            return Err(LedgerError::Unavailable("ledger offline".into()));
        }
        Ok(())
    }

    fn block_number_of(&self, hash: &BlockHash) -> Option<u64> {
        (0..=self.head).find(|n| &MemoryLedger::hash_for(*n) == hash)
    }

    fn envelope_at(&self, netuid: NetUid, hotkey: &Hotkey, block: u64) -> Option<&CommitmentEnvelope> {
        self.commitments
            .get(&netuid)?
            .get(hotkey)?
            .iter()
            .rev()
            .find(|(at, _)| *at <= block)
            .map(|(_, envelope)| envelope)
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn read_record(&self, netuid: NetUid, uid: Uid) -> Result<Option<String>> {
        let inner = self.read();
        inner.ensure_online()?;

        let Some(hotkey) = inner.registrations.get(&(netuid, uid)) else {
            return Ok(None);
        };
        let Some(wire) = inner
            .envelope_at(netuid, hotkey, inner.head)
            .and_then(|e| e.first_payload())
        else {
            return Ok(None);
        };

        // The chain hands back the decoded text; fall back to the raw value
        // when the stored payload is not hex.
        let stripped = wire.strip_prefix("0x").unwrap_or(wire);
        let text = hex::decode(stripped)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .unwrap_or_else(|| wire.to_string());
        Ok(Some(text))
    }

    async fn read_all_records(
        &self,
        netuid: NetUid,
        at: Option<BlockHash>,
    ) -> Result<Vec<(Hotkey, CommitmentEnvelope)>> {
        let inner = self.read();
        inner.ensure_online()?;

        let block = match at {
            Some(hash) => inner
                .block_number_of(&hash)
                .ok_or_else(|| LedgerError::Unavailable(format!("unknown block hash {}", hash)))?,
            None => inner.head,
        };

        let Some(by_hotkey) = inner.commitments.get(&netuid) else {
            return Ok(Vec::new());
        };

        Ok(by_hotkey
            .keys()
            .filter_map(|hotkey| {
                inner
                    .envelope_at(netuid, hotkey, block)
                    .map(|e| (*hotkey, e.clone()))
            })
            .collect())
    }

    async fn submit_record(&self, commitment: SignedCommitment) -> Result<SubmitAck> {
        let mut inner = self.write();
        inner.ensure_online()?;

        if inner.reject_submissions {
            return Err(LedgerError::Rejected("submissions disabled".into()));
        }

        commitment.verify()?;

        if inner.registrations.get(&(commitment.netuid, commitment.uid)) != Some(&commitment.signer) {
            return Err(LedgerError::Rejected(format!(
                "hotkey {} does not own uid {}",
                commitment.signer, commitment.uid
            )));
        }

        let head = inner.head;
        let wire = format!("0x{}", hex::encode(commitment.payload.as_bytes()));
        inner
            .commitments
            .entry(commitment.netuid)
            .or_default()
            .entry(commitment.signer)
            .or_default()
            .push((head, CommitmentEnvelope::single(RAW_FIELD_KIND, wire)));

        tracing::debug!(uid = %commitment.uid, block = head, "commitment accepted");
        inner.submissions.push(commitment);

        Ok(SubmitAck { block: head })
    }

    async fn block_hash(&self, number: u64) -> Result<BlockHash> {
        let inner = self.read();
        inner.ensure_online()?;
        if number > inner.head {
            return Err(LedgerError::UnknownBlock(number));
        }
        Ok(Self::hash_for(number))
    }

    async fn latest_block(&self) -> Result<BlockHeader> {
        let inner = self.read();
        inner.ensure_online()?;
        Ok(BlockHeader {
            number: inner.head,
            hash: Self::hash_for(inner.head),
        })
    }

    async fn subscribe_new_blocks(&self) -> Result<BlockSubscription> {
        let mut inner = self.write();
        inner.subscribe_attempts += 1;
        inner.ensure_online()?;

        if inner.subscribe_failures > 0 {
            inner.subscribe_failures -= 1;
            return Err(LedgerError::Unavailable("subscription refused".into()));
        }

        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        inner.subscribers.push(tx);
        Ok(rx)
    }
}
