//! Membership view: which hotkey holds which slot, and with how much stake.
//!
//! The view is owned and refreshed by the caller. The chain manager only
//! reads it, and sees whatever snapshot is current at lookup time.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use commitsync_core::{Hotkey, Uid};

/// Read-only membership queries.
pub trait Membership: Send + Sync {
    /// All known slots, ascending.
    fn uids(&self) -> Vec<Uid>;

    /// Slot held by `hotkey`, if registered.
    fn uid_for_hotkey(&self, hotkey: &Hotkey) -> Option<Uid>;

    /// Hotkey registered at `uid`, if any.
    fn hotkey_for_uid(&self, uid: Uid) -> Option<Hotkey>;

    /// Stake held at `uid`. Unknown slots have zero stake.
    fn stake(&self, uid: Uid) -> f64;
}

/// A registered participant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neuron {
    pub hotkey: Hotkey,
    pub stake: f64,
}

/// A point-in-time membership snapshot.
#[derive(Debug, Clone, Default)]
pub struct Metagraph {
    neurons: BTreeMap<Uid, Neuron>,
}

impl Metagraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the neuron at `uid`.
    pub fn insert(&mut self, uid: Uid, hotkey: Hotkey, stake: f64) {
        self.neurons.insert(uid, Neuron { hotkey, stake });
    }

    /// Builder form of [`Metagraph::insert`].
    pub fn with_neuron(mut self, uid: Uid, hotkey: Hotkey, stake: f64) -> Self {
        self.insert(uid, hotkey, stake);
        self
    }

    /// Remove the neuron at `uid`.
    pub fn remove(&mut self, uid: Uid) -> Option<Neuron> {
        self.neurons.remove(&uid)
    }

    /// Update the stake at `uid`. Returns false if the slot is empty.
    pub fn set_stake(&mut self, uid: Uid, stake: f64) -> bool {
        match self.neurons.get_mut(&uid) {
            Some(neuron) => {
                neuron.stake = stake;
                true
            }
            None => false,
        }
    }

    pub fn neuron(&self, uid: Uid) -> Option<&Neuron> {
        self.neurons.get(&uid)
    }

    pub fn len(&self) -> usize {
        self.neurons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neurons.is_empty()
    }
}

impl Membership for Metagraph {
    fn uids(&self) -> Vec<Uid> {
        self.neurons.keys().copied().collect()
    }

    fn uid_for_hotkey(&self, hotkey: &Hotkey) -> Option<Uid> {
        self.neurons
            .iter()
            .find(|(_, neuron)| &neuron.hotkey == hotkey)
            .map(|(uid, _)| *uid)
    }

    fn hotkey_for_uid(&self, uid: Uid) -> Option<Hotkey> {
        self.neurons.get(&uid).map(|n| n.hotkey)
    }

    fn stake(&self, uid: Uid) -> f64 {
        self.neurons.get(&uid).map(|n| n.stake).unwrap_or(0.0)
    }
}

/// A metagraph shared with the code that refreshes it.
///
/// Clones share the same underlying snapshot.
#[derive(Debug, Clone, Default)]
pub struct SharedMetagraph {
    inner: Arc<RwLock<Metagraph>>,
}

impl SharedMetagraph {
    pub fn new(metagraph: Metagraph) -> Self {
        Self {
            inner: Arc::new(RwLock::new(metagraph)),
        }
    }

    /// Swap in a freshly synced snapshot.
    pub fn replace(&self, metagraph: Metagraph) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = metagraph;
    }

    /// Mutate the snapshot in place.
    pub fn update<R>(&self, f: impl FnOnce(&mut Metagraph) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Clone out the current snapshot.
    pub fn snapshot(&self) -> Metagraph {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn with<R>(&self, f: impl FnOnce(&Metagraph) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }
}

impl Membership for SharedMetagraph {
    fn uids(&self) -> Vec<Uid> {
        self.with(|m| m.uids())
    }

    fn uid_for_hotkey(&self, hotkey: &Hotkey) -> Option<Uid> {
        self.with(|m| m.uid_for_hotkey(hotkey))
    }

    fn hotkey_for_uid(&self, uid: Uid) -> Option<Hotkey> {
        self.with(|m| m.hotkey_for_uid(uid))
    }

    fn stake(&self, uid: Uid) -> f64 {
        self.with(|m| m.stake(uid))
    }
}
