//! Block listener: follows new blocks and advances the chain clock.
//!
//! Subscription failures and ended streams are retried with a fixed backoff
//! until the stop signal is raised.

use std::sync::Arc;

use tokio::sync::watch;

use commitsync_ledger::BlockSubscription;

use crate::manager::Shared;
use crate::refresh::stopped;
use crate::retry::RetryState;

pub(crate) struct BlockListener {
    shared: Arc<Shared>,
    retry: RetryState,
}

impl BlockListener {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        let retry = RetryState::new(shared.config.subscribe_backoff());
        Self { shared, retry }
    }

    /// One subscription attempt. Success clears the failure count.
    async fn subscribe(&mut self) -> Option<BlockSubscription> {
        match self.shared.ledger.subscribe_new_blocks().await {
            Ok(blocks) => {
                self.retry.reset();
                tracing::debug!("subscribed to new blocks");
                Some(blocks)
            }
            Err(e) => {
                self.retry.record_failure();
                tracing::warn!(attempt = self.retry.attempts(), error = %e, "block subscription failed");
                None
            }
        }
    }

    pub(crate) async fn run(mut self, mut stop: watch::Receiver<bool>) {
        tracing::debug!("block listener started");

        'subscribe: loop {
            let subscribed = tokio::select! {
                _ = stopped(&mut stop) => break 'subscribe,
                blocks = self.subscribe() => blocks,
            };

            if let Some(mut blocks) = subscribed {
                loop {
                    let header = tokio::select! {
                        _ = stopped(&mut stop) => break 'subscribe,
                        header = blocks.recv() => header,
                    };
                    let Some(header) = header else {
                        self.retry.record_failure();
                        tracing::warn!("block subscription ended");
                        break;
                    };
                    self.shared.observe_block(header.number);
                }
            }

            tokio::select! {
                _ = stopped(&mut stop) => break 'subscribe,
                _ = tokio::time::sleep(self.retry.backoff()) => {}
            }
        }

        tracing::debug!("block listener stopped");
    }
}
