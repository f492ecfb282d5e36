//! Pause/stop control plane
//!
//! A [`ControlHandle`] is cloned into the scheduler, every worker, and the
//! surrounding application (a CLI signal handler, a GUI button). Pausing
//! suspends new dispatches without touching in-flight work; stopping is
//! one-way and wakes anything suspended on the control plane, including a
//! pause wait in progress.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

struct ControlShared {
    stop: AtomicBool,
    pause_tx: watch::Sender<bool>,
}

/// Shared pause/stop switchboard for one crawl
///
/// All methods are safe to call from any thread. Waits are event-driven;
/// nothing here polls.
#[derive(Clone)]
pub struct ControlHandle {
    shared: Arc<ControlShared>,
}

impl ControlHandle {
    /// Creates a handle in the running (not paused, not stopped) state
    pub fn new() -> Self {
        let (pause_tx, _) = watch::channel(false);
        Self {
            shared: Arc::new(ControlShared {
                stop: AtomicBool::new(false),
                pause_tx,
            }),
        }
    }

    /// Suspends submission of new work until [`resume`](Self::resume)
    pub fn pause(&self) {
        self.shared.pause_tx.send_replace(true);
    }

    /// Clears the pause flag, waking the scheduling loop
    pub fn resume(&self) {
        self.shared.pause_tx.send_replace(false);
    }

    /// Requests the crawl to stop; irreversible
    ///
    /// Also clears pause so a paused scheduling loop observes the stop
    /// immediately instead of sleeping through it.
    pub fn stop(&self) {
        self.shared.stop.store(true, Ordering::SeqCst);
        self.shared.pause_tx.send_replace(false);
    }

    /// Whether stop has been requested
    pub fn should_stop(&self) -> bool {
        self.shared.stop.load(Ordering::SeqCst)
    }

    /// Whether the pause flag is currently set
    pub fn is_paused(&self) -> bool {
        *self.shared.pause_tx.borrow()
    }

    /// Suspends the caller while the pause flag is set
    ///
    /// Returns immediately when not paused. A stop request ends the wait
    /// even if the crawl is still flagged paused.
    pub async fn wait_while_paused(&self) {
        let mut rx = self.shared.pause_tx.subscribe();
        loop {
            if self.should_stop() || !*rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Resolves once stop has been requested
    pub async fn stopped(&self) {
        let mut rx = self.shared.pause_tx.subscribe();
        loop {
            if self.should_stop() {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Sleeps for `duration` unless stop arrives first
    ///
    /// Returns `true` when the full sleep elapsed, `false` when it was cut
    /// short by a stop request.
    pub async fn sleep_unless_stopped(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(duration) => true,
            _ = self.stopped() => false,
        }
    }
}

impl Default for ControlHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;

    #[test]
    fn test_initial_state() {
        let control = ControlHandle::new();
        assert!(!control.should_stop());
        assert!(!control.is_paused());
    }

    #[test]
    fn test_stop_is_monotonic() {
        let control = ControlHandle::new();
        control.stop();
        assert!(control.should_stop());

        // Neither pause nor resume may clear a stop
        control.pause();
        control.resume();
        assert!(control.should_stop());
    }

    #[tokio::test]
    async fn test_wait_while_paused_returns_immediately_when_running() {
        let control = ControlHandle::new();
        timeout(Duration::from_millis(50), control.wait_while_paused())
            .await
            .expect("must not block while running");
    }

    #[tokio::test]
    async fn test_wait_while_paused_blocks_until_resume() {
        let control = ControlHandle::new();
        control.pause();

        let blocked = timeout(Duration::from_millis(50), control.wait_while_paused()).await;
        assert!(blocked.is_err(), "wait must block while paused");

        let waiter = {
            let control = control.clone();
            tokio::spawn(async move { control.wait_while_paused().await })
        };
        control.resume();

        timeout(Duration::from_millis(200), waiter)
            .await
            .expect("resume must wake the waiter")
            .unwrap();
    }

    #[tokio::test]
    async fn test_stop_wakes_paused_waiter() {
        let control = ControlHandle::new();
        control.pause();

        let waiter = {
            let control = control.clone();
            tokio::spawn(async move { control.wait_while_paused().await })
        };
        control.stop();

        timeout(Duration::from_millis(200), waiter)
            .await
            .expect("stop must wake the paused waiter")
            .unwrap();
    }

    #[tokio::test]
    async fn test_sleep_unless_stopped_cut_short() {
        let control = ControlHandle::new();

        let sleeper = {
            let control = control.clone();
            tokio::spawn(async move { control.sleep_unless_stopped(Duration::from_secs(30)).await })
        };
        control.stop();

        let completed = timeout(Duration::from_millis(200), sleeper)
            .await
            .expect("stop must end the sleep")
            .unwrap();
        assert!(!completed);
    }

    #[tokio::test]
    async fn test_sleep_unless_stopped_full_duration() {
        let control = ControlHandle::new();
        assert!(control.sleep_unless_stopped(Duration::from_millis(5)).await);
    }
}
