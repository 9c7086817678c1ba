//! # Day Rollover Watcher
//!
//! The async half of the day resolver: a background task polling the local
//! calendar date and publishing the current [`DayKey`] when it changes.
//!
//! ## Rollover Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Midnight Rollover                                 │
//! │                                                                         │
//! │  interval tick (default 60s)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  rollover(&current)? ── None ──► keep waiting                           │
//! │       │ Some(new_day)                                                   │
//! │       ▼                                                                 │
//! │  watch channel broadcasts new DayKey                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  subscribers tear down their old day's reads, then re-point to the      │
//! │  new (empty) buckets. Teardown BEFORE rebind, or yesterday's data       │
//! │  keeps streaming into today's view.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Dropping the watcher aborts the task; leaking the poll loop past the
//! owner's lifetime is the bug this type exists to prevent.

use std::time::Duration;

use miga_core::day::{rollover, DayKey};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Default poll interval: once a minute, matching how stale a day view is
/// allowed to get.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Background watcher publishing the current day key.
#[derive(Debug)]
pub struct DayWatcher {
    rx: watch::Receiver<DayKey>,
    handle: JoinHandle<()>,
}

impl DayWatcher {
    /// Spawns the poll task with the default 60-second interval.
    pub fn spawn() -> Self {
        Self::spawn_with_interval(DEFAULT_POLL_INTERVAL)
    }

    /// Spawns the poll task with a custom interval (tests use a short one).
    pub fn spawn_with_interval(poll_interval: Duration) -> Self {
        let initial = DayKey::today();
        let (tx, rx) = watch::channel(initial.clone());

        let handle = tokio::spawn(async move {
            let mut current = initial;
            let mut ticker = tokio::time::interval(poll_interval);
            // The first tick fires immediately; skip it, we just resolved.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Some(new_day) = rollover(&current) {
                    info!(from = %current, to = %new_day, "day rollover detected");
                    current = new_day.clone();
                    // Send fails only when every receiver is gone, at which
                    // point the task is about to be aborted anyway.
                    if tx.send(new_day).is_err() {
                        debug!("all day subscribers dropped, stopping watch");
                        break;
                    }
                }
            }
        });

        DayWatcher { rx, handle }
    }

    /// The day key as of the last poll.
    pub fn current(&self) -> DayKey {
        self.rx.borrow().clone()
    }

    /// A receiver that yields whenever the day changes. Subscribers must
    /// tear down their old day's reads before re-pointing.
    pub fn subscribe(&self) -> watch::Receiver<DayKey> {
        self.rx.clone()
    }
}

impl Drop for DayWatcher {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_watcher_starts_at_today() {
        let watcher = DayWatcher::spawn_with_interval(Duration::from_millis(10));
        assert_eq!(watcher.current(), DayKey::today());
    }

    #[tokio::test]
    async fn test_subscriber_sees_initial_day() {
        let watcher = DayWatcher::spawn_with_interval(Duration::from_millis(10));
        let rx = watcher.subscribe();
        assert_eq!(*rx.borrow(), DayKey::today());
    }

    #[tokio::test]
    async fn test_drop_aborts_poll_task() {
        let watcher = DayWatcher::spawn_with_interval(Duration::from_millis(10));
        let rx = watcher.subscribe();
        drop(watcher);

        // The sender side is owned by the aborted task; once it is gone the
        // receiver reports the channel closed.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.has_changed().is_err());
    }
}
