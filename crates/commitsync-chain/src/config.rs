//! Chain manager configuration.

use std::num::NonZeroU64;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use commitsync_core::NetUid;

use crate::error::{ChainError, Result};

/// Longest accepted refresh interval: one week.
pub const MAX_REFRESH_INTERVAL_SECS: u64 = 7 * 24 * 60 * 60;

/// Longest accepted subscription backoff: one hour.
pub const MAX_SUBSCRIBE_BACKOFF_MS: u64 = 60 * 60 * 1_000;

/// Configuration for the chain manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Ledger namespace commitments are read from and published to.
    pub netuid: NetUid,
    /// Blocks per window.
    pub window_length: u64,
    /// Seconds between background commitment refreshes.
    pub refresh_interval_secs: u64,
    /// Uids holding more stake than this are validators, not peers.
    pub stake_threshold: f64,
    /// Delay between block subscription attempts, in milliseconds.
    pub subscribe_backoff_ms: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            netuid: NetUid(3),
            window_length: 100,
            refresh_interval_secs: 60,
            stake_threshold: 10_000.0,
            subscribe_backoff_ms: 1_000,
        }
    }
}

impl ChainConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn subscribe_backoff(&self) -> Duration {
        Duration::from_millis(self.subscribe_backoff_ms)
    }

    /// Window length as a non-zero divisor.
    pub fn window_length(&self) -> Result<NonZeroU64> {
        NonZeroU64::new(self.window_length)
            .ok_or_else(|| ChainError::Config("window_length must be non-zero".into()))
    }

    /// Reject settings the manager cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.window_length()?;
        if self.refresh_interval_secs == 0 {
            return Err(ChainError::Config(
                "refresh_interval_secs must be non-zero".into(),
            ));
        }
        if self.refresh_interval_secs > MAX_REFRESH_INTERVAL_SECS {
            return Err(ChainError::Config(format!(
                "refresh_interval_secs must be at most {}",
                MAX_REFRESH_INTERVAL_SECS
            )));
        }
        if self.subscribe_backoff_ms > MAX_SUBSCRIBE_BACKOFF_MS {
            return Err(ChainError::Config(format!(
                "subscribe_backoff_ms must be at most {}",
                MAX_SUBSCRIBE_BACKOFF_MS
            )));
        }
        if !self.stake_threshold.is_finite() {
            return Err(ChainError::Config("stake_threshold must be finite".into()));
        }
        Ok(())
    }
}
