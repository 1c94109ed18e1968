//! Attempt-scoped tick scheduling.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

/// A repeating tick source whose lifetime is tied to one attempt.
///
/// Dropping the timer aborts the background task, so every state-exit path
/// (level change, retry, give-up, unmount) cancels its ticks by dropping
/// the guard. A stale timer can therefore never mutate state after its
/// owning attempt has ended.
#[derive(Debug)]
pub struct AttemptTimer {
    rx: mpsc::UnboundedReceiver<()>,
    handle: JoinHandle<()>,
}

impl AttemptTimer {
    /// Starts a timer emitting one tick per `period`.
    #[instrument]
    pub fn start(period: Duration) -> Self {
        debug!("Starting attempt timer");
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick of tokio's interval fires immediately; skip it
            // so the attempt clock starts at zero.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(()).is_err() {
                    break;
                }
            }
        });
        Self { rx, handle }
    }

    /// Drains and counts the ticks that have elapsed since the last call.
    pub fn drain(&mut self) -> usize {
        let mut count = 0;
        while self.rx.try_recv().is_ok() {
            count += 1;
        }
        count
    }
}

impl Drop for AttemptTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_accumulate_with_time() {
        let mut timer = AttemptTimer::start(Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(550)).await;
        // Let the spawned task run.
        tokio::task::yield_now().await;
        assert!(timer.drain() >= 5);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_timer_stops_ticking() {
        let timer = AttemptTimer::start(Duration::from_millis(100));
        let handle = timer.handle.abort_handle();
        drop(timer);
        tokio::task::yield_now().await;
        assert!(handle.is_finished());
    }
}
