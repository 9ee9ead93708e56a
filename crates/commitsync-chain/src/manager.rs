//! The chain manager.
//!
//! One instance per process (or per test). All mutable state lives behind
//! the manager; background tasks hold an `Arc` of the shared part and stop
//! when the manager raises its stop signal or is dropped.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockWriteGuard};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use commitsync_core::{decode, BucketRecord, Hotkey, Uid};
use commitsync_ledger::{Ledger, Membership};

use crate::clock::{BlockUpdate, ChainClock, ClockState};
use crate::config::ChainConfig;
use crate::error::{ChainError, Result};
use crate::index::{CommitmentIndex, CommitmentSnapshot};
use crate::listener::BlockListener;
use crate::peers::classify_peers;
use crate::reconcile::{self, Identity, ReconcileOutcome};
use crate::refresh::{fetch_index, run_refresh_loop, RefreshOutcome};

/// State shared between the manager and its background tasks.
pub(crate) struct Shared {
    pub(crate) config: ChainConfig,
    pub(crate) ledger: Arc<dyn Ledger>,
    pub(crate) membership: Arc<dyn Membership>,
    pub(crate) clock: ChainClock,
    /// Replaced wholesale; readers never see a half-built index.
    installed: RwLock<Installed>,
    /// Last generation handed to a refresh pass.
    generations: AtomicU64,
}

/// The current snapshot and the refresh generation that produced it.
struct Installed {
    generation: u64,
    snapshot: Arc<CommitmentSnapshot>,
}

impl Shared {
    fn new(
        config: ChainConfig,
        ledger: Arc<dyn Ledger>,
        membership: Arc<dyn Membership>,
        clock: ChainClock,
    ) -> Self {
        Self {
            config,
            ledger,
            membership,
            clock,
            installed: RwLock::new(Installed {
                generation: 0,
                snapshot: Arc::new(CommitmentSnapshot::default()),
            }),
            generations: AtomicU64::new(0),
        }
    }

    pub(crate) fn snapshot(&self) -> Arc<CommitmentSnapshot> {
        let installed = self.installed.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&installed.snapshot)
    }

    fn installed_mut(&self) -> RwLockWriteGuard<'_, Installed> {
        self.installed.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Generation for a refresh pass about to read the ledger.
    fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Install a snapshot read by refresh `generation`.
    ///
    /// Returns false, leaving the current snapshot in place, if a pass that
    /// started later has already installed its result.
    fn install(&self, generation: u64, snapshot: CommitmentSnapshot) -> bool {
        let mut installed = self.installed_mut();
        if generation < installed.generation {
            return false;
        }
        *installed = Installed {
            generation,
            snapshot: Arc::new(snapshot),
        };
        true
    }

    /// Re-classify peers of the installed index in place.
    fn reclassify_peers(&self) -> Vec<Uid> {
        let mut installed = self.installed_mut();
        let peers = classify_peers(
            &installed.snapshot.commitments,
            self.membership.as_ref(),
            self.config.stake_threshold,
        );
        installed.snapshot = Arc::new(CommitmentSnapshot {
            commitments: installed.snapshot.commitments.clone(),
            peers: peers.clone(),
        });
        peers
    }

    /// One refresh pass. An empty result keeps the previous snapshot.
    pub(crate) async fn refresh(&self) -> Result<RefreshOutcome> {
        let generation = self.next_generation();
        let (commitments, report) =
            fetch_index(self.ledger.as_ref(), self.membership.as_ref(), self.config.netuid, None)
                .await?;

        if commitments.is_empty() {
            tracing::warn!(
                unknown_hotkeys = report.unknown_hotkeys,
                empty = report.empty,
                malformed = report.malformed,
                "no commitments decoded, keeping previous index"
            );
            return Ok(RefreshOutcome::Empty);
        }

        let peers = classify_peers(
            &commitments,
            self.membership.as_ref(),
            self.config.stake_threshold,
        );
        let count = commitments.len();

        let installed = self.install(
            generation,
            CommitmentSnapshot {
                commitments,
                peers: peers.clone(),
            },
        );
        if !installed {
            tracing::debug!(generation, "refresh superseded by a newer pass");
            return Ok(RefreshOutcome::Superseded);
        }

        tracing::info!(
            count,
            peers = peers.len(),
            malformed = report.malformed,
            "commitment index replaced"
        );

        Ok(RefreshOutcome::Replaced { count, peers })
    }

    pub(crate) fn observe_block(&self, block: u64) {
        match self.clock.observe(block) {
            BlockUpdate::NewWindow { previous, current } => {
                tracing::info!(block, previous, current, "entered new window");
            }
            BlockUpdate::Advanced => tracing::trace!(block, "block advanced"),
            BlockUpdate::Ignored => tracing::trace!(block, "stale block ignored"),
        }
    }
}

/// Keeps the local view of published bucket commitments in step with the
/// ledger.
///
/// ## Lifecycle
///
/// 1. [`ChainManager::start`] reconciles the local commitment, runs one
///    synchronous refresh, and spawns the periodic refresh task.
/// 2. [`ChainManager::spawn_block_listener`] optionally follows new blocks.
/// 3. [`ChainManager::shutdown`] stops and joins both tasks. Dropping the
///    manager also stops them, without waiting.
pub struct ChainManager {
    shared: Arc<Shared>,
    identity: Option<Identity>,
    stop: watch::Sender<bool>,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
    listener_task: Mutex<Option<JoinHandle<()>>>,
}

impl ChainManager {
    /// Create a manager without touching the ledger or spawning tasks.
    pub fn new(
        config: ChainConfig,
        ledger: Arc<dyn Ledger>,
        membership: Arc<dyn Membership>,
        identity: Option<Identity>,
    ) -> Result<Self> {
        config.validate()?;
        let clock = ChainClock::new(config.window_length()?);
        let (stop, _) = watch::channel(false);

        Ok(Self {
            shared: Arc::new(Shared::new(config, ledger, membership, clock)),
            identity,
            stop,
            refresh_task: Mutex::new(None),
            listener_task: Mutex::new(None),
        })
    }

    /// Create, initialize, and start the periodic refresh.
    ///
    /// Returns once the clock is seeded and the first refresh has run, so
    /// callers observe a populated index. Ledger failures during startup are
    /// logged; only invalid configuration is an error.
    pub async fn start(
        config: ChainConfig,
        ledger: Arc<dyn Ledger>,
        membership: Arc<dyn Membership>,
        identity: Option<Identity>,
    ) -> Result<Self> {
        let manager = Self::new(config, ledger, membership, identity)?;
        manager.initialize().await;
        manager.spawn_refresh_task()?;
        Ok(manager)
    }

    /// Seed the clock, reconcile once, and refresh once.
    pub async fn initialize(&self) {
        match self.shared.ledger.latest_block().await {
            Ok(header) => self.shared.observe_block(header.number),
            Err(e) => tracing::warn!(error = %e, "failed to read latest block"),
        }

        if self.identity.is_some() {
            if let Err(e) = self.reconcile().await {
                tracing::warn!(error = %e, "startup reconciliation failed");
            }
        }

        if let Err(e) = self.shared.refresh().await {
            tracing::warn!(error = %e, "startup refresh failed");
        }
    }

    /// Spawn the periodic refresh task.
    pub fn spawn_refresh_task(&self) -> Result<()> {
        let shared = Arc::clone(&self.shared);
        let stop = self.stop.subscribe();
        spawn_once(&self.refresh_task, "refresh task", move || {
            tokio::spawn(run_refresh_loop(shared, stop))
        })
    }

    /// Spawn the block listener.
    pub fn spawn_block_listener(&self) -> Result<()> {
        let shared = Arc::clone(&self.shared);
        let stop = self.stop.subscribe();
        spawn_once(&self.listener_task, "block listener", move || {
            tokio::spawn(BlockListener::new(shared).run(stop))
        })
    }

    #[cfg(test)]
    pub(crate) fn shared(&self) -> Arc<Shared> {
        Arc::clone(&self.shared)
    }

    /// Whether the stop signal has been raised.
    pub fn is_stopped(&self) -> bool {
        *self.stop.borrow()
    }

    /// Raise the stop signal and wait for both tasks to exit.
    pub async fn shutdown(&self) {
        self.stop.send_replace(true);

        let handles = [take(&self.refresh_task), take(&self.listener_task)];
        for handle in handles.into_iter().flatten() {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "background task ended abnormally");
            }
        }

        tracing::debug!("chain manager stopped");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Actions
    // ─────────────────────────────────────────────────────────────────────────

    /// Compare-and-publish the local commitment.
    ///
    /// A failed submission is reported in the outcome, not as an error.
    pub async fn reconcile(&self) -> Result<ReconcileOutcome> {
        let identity = self.require_identity()?;
        reconcile::reconcile(
            self.shared.ledger.as_ref(),
            self.shared.membership.as_ref(),
            self.shared.config.netuid,
            identity,
        )
        .await
    }

    /// Like [`reconcile`](Self::reconcile), but a failed submission is an
    /// error.
    pub async fn publish(&self) -> Result<ReconcileOutcome> {
        match self.reconcile().await? {
            ReconcileOutcome::PublishFailed { error, .. } => Err(ChainError::PublishFailure(error)),
            outcome => Ok(outcome),
        }
    }

    /// Run one refresh pass now.
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        self.shared.refresh().await
    }

    /// Re-derive the peer set against current stake, keeping the index.
    pub fn refresh_peers(&self) -> Vec<Uid> {
        self.shared.reclassify_peers()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Commitment queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Indexed record for `uid`.
    pub fn bucket(&self, uid: Uid) -> Option<BucketRecord> {
        self.shared.snapshot().commitments.get(&uid).cloned()
    }

    /// Indexed record for every uid in the membership view.
    pub fn all_buckets(&self) -> BTreeMap<Uid, Option<BucketRecord>> {
        let snapshot = self.shared.snapshot();
        self.shared
            .membership
            .uids()
            .into_iter()
            .map(|uid| (uid, snapshot.commitments.get(&uid).cloned()))
            .collect()
    }

    /// Published record of `hotkey`, read from the ledger.
    ///
    /// `None` if the hotkey holds no slot or has never committed.
    pub async fn bucket_for_hotkey(&self, hotkey: &Hotkey) -> Result<Option<BucketRecord>> {
        match self.shared.membership.uid_for_hotkey(hotkey) {
            Some(uid) => self.fetch_commitment(uid).await,
            None => Ok(None),
        }
    }

    /// Published record of `uid`, read from the ledger.
    pub async fn fetch_commitment(&self, uid: Uid) -> Result<Option<BucketRecord>> {
        let text = self
            .shared
            .ledger
            .read_record(self.shared.config.netuid, uid)
            .await?;
        text.map(|t| decode(&t)).transpose().map_err(ChainError::from)
    }

    /// Bulk read at `block` (or the latest), without touching the index.
    pub async fn fetch_commitments(&self, block: Option<u64>) -> Result<CommitmentIndex> {
        let (index, _) = fetch_index(
            self.shared.ledger.as_ref(),
            self.shared.membership.as_ref(),
            self.shared.config.netuid,
            block,
        )
        .await?;
        Ok(index)
    }

    pub fn hotkey(&self, uid: Uid) -> Option<Hotkey> {
        self.shared.membership.hotkey_for_uid(uid)
    }

    pub fn commitments(&self) -> CommitmentIndex {
        self.shared.snapshot().commitments.clone()
    }

    pub fn peers(&self) -> Vec<Uid> {
        self.shared.snapshot().peers.clone()
    }

    /// Index and peers as replaced together by the last refresh.
    pub fn snapshot(&self) -> Arc<CommitmentSnapshot> {
        self.shared.snapshot()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn config(&self) -> &ChainConfig {
        &self.shared.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Clock
    // ─────────────────────────────────────────────────────────────────────────

    pub fn block_to_window(&self, block: u64) -> u64 {
        self.shared.clock.block_to_window(block)
    }

    /// Hex hash of the first block of `window`.
    pub async fn window_to_seed(&self, window: u64) -> Result<String> {
        let block = self.shared.clock.window_start(window);
        let hash = self.shared.ledger.block_hash(block).await?;
        Ok(hash.to_hex())
    }

    pub fn current_block(&self) -> u64 {
        self.shared.clock.current_block()
    }

    pub fn current_window(&self) -> u64 {
        self.shared.clock.current_window()
    }

    pub fn clock_state(&self) -> ClockState {
        self.shared.clock.state()
    }

    pub async fn wait_for_block(&self, block: u64) -> ClockState {
        self.shared.clock.wait_for_block(block).await
    }

    pub async fn wait_for_window(&self, window: u64) -> ClockState {
        self.shared.clock.wait_for_window(window).await
    }

    /// Receiver notified on every block and window change.
    pub fn subscribe_clock(&self) -> watch::Receiver<ClockState> {
        self.shared.clock.subscribe()
    }

    fn require_identity(&self) -> Result<&Identity> {
        self.identity
            .as_ref()
            .ok_or_else(|| ChainError::Config("no local identity configured".into()))
    }
}

impl Drop for ChainManager {
    fn drop(&mut self) {
        self.stop.send_replace(true);
    }
}

fn spawn_once(
    slot: &Mutex<Option<JoinHandle<()>>>,
    name: &'static str,
    spawn: impl FnOnce() -> JoinHandle<()>,
) -> Result<()> {
    let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
    if slot.is_some() {
        return Err(ChainError::AlreadyRunning(name));
    }
    *slot = Some(spawn());
    Ok(())
}

fn take(slot: &Mutex<Option<JoinHandle<()>>>) -> Option<JoinHandle<()>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner).take()
}
