//! Chain clock: latest observed block and the window derived from it.
//!
//! Block and window are published together through one `watch` value, so a
//! reader never sees a window computed from a different block.

use std::num::NonZeroU64;

use tokio::sync::watch;

/// A consistent `(block, window)` pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockState {
    pub block: u64,
    pub window: u64,
}

/// Effect of observing a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockUpdate {
    /// The block was not newer than the current one.
    Ignored,
    /// The block advanced within the current window.
    Advanced,
    /// The block crossed into a new window.
    NewWindow { previous: u64, current: u64 },
}

/// Single-writer, many-reader clock.
pub struct ChainClock {
    window_length: NonZeroU64,
    state: watch::Sender<ClockState>,
}

impl ChainClock {
    pub fn new(window_length: NonZeroU64) -> Self {
        let (state, _) = watch::channel(ClockState::default());
        Self {
            window_length,
            state,
        }
    }

    pub fn window_length(&self) -> u64 {
        self.window_length.get()
    }

    /// Window containing `block`.
    pub fn block_to_window(&self, block: u64) -> u64 {
        block / self.window_length.get()
    }

    /// First block of `window`.
    pub fn window_start(&self, window: u64) -> u64 {
        window.saturating_mul(self.window_length.get())
    }

    /// Record a newly observed block.
    ///
    /// The block height never moves backwards; older blocks are ignored.
    pub fn observe(&self, block: u64) -> BlockUpdate {
        let window = self.block_to_window(block);
        let mut update = BlockUpdate::Ignored;

        self.state.send_if_modified(|state| {
            if block <= state.block {
                return false;
            }
            update = if window != state.window {
                BlockUpdate::NewWindow {
                    previous: state.window,
                    current: window,
                }
            } else {
                BlockUpdate::Advanced
            };
            *state = ClockState { block, window };
            true
        });

        update
    }

    pub fn state(&self) -> ClockState {
        *self.state.borrow()
    }

    pub fn current_block(&self) -> u64 {
        self.state().block
    }

    pub fn current_window(&self) -> u64 {
        self.state().window
    }

    /// Receiver notified on every clock change.
    pub fn subscribe(&self) -> watch::Receiver<ClockState> {
        self.state.subscribe()
    }

    /// Wait until the clock reaches `block`.
    pub async fn wait_for_block(&self, block: u64) -> ClockState {
        self.wait_until(|s| s.block >= block).await
    }

    /// Wait until the clock enters `window` or a later one.
    pub async fn wait_for_window(&self, window: u64) -> ClockState {
        self.wait_until(|s| s.window >= window).await
    }

    async fn wait_until(&self, mut done: impl FnMut(&ClockState) -> bool) -> ClockState {
        let mut rx = self.state.subscribe();
        let state = match rx.wait_for(|s| done(s)).await {
            Ok(state) => *state,
            // The sender lives in `self`, so this only happens during teardown.
            Err(_) => self.state(),
        };
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn clock(window_length: u64) -> ChainClock {
        ChainClock::new(NonZeroU64::new(window_length).unwrap())
    }

    #[test]
    fn test_window_boundary_crossing() {
        let clock = clock(100);
        clock.observe(199);
        assert_eq!(clock.current_window(), 1);

        let update = clock.observe(200);
        assert_eq!(
            update,
            BlockUpdate::NewWindow {
                previous: 1,
                current: 2
            }
        );
        assert_eq!(clock.state(), ClockState { block: 200, window: 2 });
    }

    #[test]
    fn test_same_window_advance() {
        let clock = clock(100);
        clock.observe(150);
        assert_eq!(clock.observe(180), BlockUpdate::Advanced);
        assert_eq!(clock.current_window(), 1);
        assert_eq!(clock.current_block(), 180);
    }

    #[test]
    fn test_older_block_ignored() {
        let clock = clock(10);
        clock.observe(55);
        assert_eq!(clock.observe(40), BlockUpdate::Ignored);
        assert_eq!(clock.observe(55), BlockUpdate::Ignored);
        assert_eq!(clock.state(), ClockState { block: 55, window: 5 });
    }

    #[test]
    fn test_window_start() {
        let clock = clock(100);
        assert_eq!(clock.window_start(3), 300);
        assert_eq!(clock.block_to_window(299), 2);
    }

    #[test]
    fn test_subscriber_sees_consistent_pair() {
        let clock = clock(100);
        let rx = clock.subscribe();
        clock.observe(250);
        let seen = *rx.borrow();
        assert_eq!(seen.window, seen.block / 100);
    }

    #[tokio::test]
    async fn test_wait_for_window() {
        let clock = Arc::new(clock(10));
        let waiter = {
            let clock = Arc::clone(&clock);
            tokio::spawn(async move { clock.wait_for_window(3).await })
        };

        for block in [5, 12, 29, 30] {
            clock.observe(block);
            tokio::task::yield_now().await;
        }

        let state = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(state, ClockState { block: 30, window: 3 });
    }

    #[tokio::test]
    async fn test_wait_for_reached_block_returns_immediately() {
        let clock = clock(10);
        clock.observe(42);
        assert_eq!(clock.wait_for_block(40).await.block, 42);
    }
}
