//! Debouncer: collapses bursts of triggers into one delayed action.
//!
//! Holds at most one pending action. Every `trigger` aborts the pending
//! timer and schedules a new one, so the action that finally runs is the one
//! from the most recent trigger. A generation counter backs up the abort on a
//! multi-thread runtime, where a timer may already be past its sleep when the
//! next trigger lands. The action itself runs under a gate that `close`
//! also takes, so once `close` returns nothing is running or can start.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::trace;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

#[derive(Default)]
struct Pending {
    handle: Option<JoinHandle<()>>,
    generation: u64,
    closed: bool,
}

pub struct Debouncer {
    delay: Duration,
    runtime: Handle,
    pending: Arc<Mutex<Pending>>,
    gate: Arc<Mutex<()>>,
}

impl Debouncer {
    /// Creates a debouncer that schedules its timers on `runtime`.
    pub fn new(delay: Duration, runtime: Handle) -> Self {
        Self {
            delay,
            runtime,
            pending: Arc::new(Mutex::new(Pending::default())),
            gate: Arc::new(Mutex::new(())),
        }
    }

    /// Schedules `action` after the debounce delay, replacing whatever was pending.
    /// Ignored once the debouncer is closed.
    pub fn trigger<F>(&self, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut pending = self.pending.lock();
        if pending.closed {
            return;
        }
        if let Some(stale) = pending.handle.take() {
            stale.abort();
        }
        pending.generation += 1;
        let generation = pending.generation;

        let shared = Arc::clone(&self.pending);
        let gate = Arc::clone(&self.gate);
        let delay = self.delay;
        pending.handle = Some(self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let _running = gate.lock();
            {
                let mut pending = shared.lock();
                if pending.closed || pending.generation != generation {
                    trace!(generation, "debounced action superseded");
                    return;
                }
                pending.handle = None;
            }
            action();
        }));
    }

    /// Drops the pending action, if any. Later triggers still schedule.
    pub fn cancel(&self) {
        let mut pending = self.pending.lock();
        pending.generation += 1;
        if let Some(stale) = pending.handle.take() {
            stale.abort();
        }
    }

    /// Cancels pending work and rejects all future triggers. Blocks until an
    /// action that already passed its checks has finished.
    pub fn close(&self) {
        {
            let mut pending = self.pending.lock();
            pending.closed = true;
            pending.generation += 1;
            if let Some(stale) = pending.handle.take() {
                stale.abort();
            }
        }
        drop(self.gate.lock());
    }

    pub fn is_pending(&self) -> bool {
        self.pending.lock().handle.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.pending.lock().closed
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> usize) {
        let count = Arc::new(AtomicUsize::new(0));
        let reader = Arc::clone(&count);
        (count, move || reader.load(Ordering::SeqCst))
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_into_one_action() {
        let debouncer = Debouncer::new(DEFAULT_DEBOUNCE, Handle::current());
        let (count, read) = counter();
        let last = Arc::new(AtomicUsize::new(0));

        for i in 1..=10 {
            let count = Arc::clone(&count);
            let last = Arc::clone(&last);
            debouncer.trigger(move || {
                count.fetch_add(1, Ordering::SeqCst);
                last.store(i, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        assert_eq!(read(), 0);
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(read(), 1);
        assert_eq!(last.load(Ordering::SeqCst), 10);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_run_separately() {
        let debouncer = Debouncer::new(Duration::from_millis(50), Handle::current());
        let (count, read) = counter();

        for _ in 0..2 {
            let count = Arc::clone(&count);
            debouncer.trigger(move || {
                count.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(80)).await;
        }
        assert_eq!(read(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_action() {
        let debouncer = Debouncer::new(DEFAULT_DEBOUNCE, Handle::current());
        let (count, read) = counter();

        let c = Arc::clone(&count);
        debouncer.trigger(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        debouncer.cancel();
        assert!(!debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(read(), 0);

        // Still usable after a cancel.
        let c = Arc::clone(&count);
        debouncer.trigger(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(read(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_close_waits_for_running_action() {
        let debouncer = Debouncer::new(Duration::from_millis(10), Handle::current());
        let (started_tx, started_rx) = std::sync::mpsc::channel();
        let finished = Arc::new(AtomicBool::new(false));

        let done = Arc::clone(&finished);
        debouncer.trigger(move || {
            let _ = started_tx.send(());
            std::thread::sleep(Duration::from_millis(200));
            done.store(true, Ordering::SeqCst);
        });

        tokio::task::spawn_blocking(move || started_rx.recv())
            .await
            .unwrap()
            .unwrap();
        debouncer.close();
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_no_action_after_close_returns() {
        let (count, read) = counter();
        for _ in 0..50 {
            let debouncer = Debouncer::new(Duration::from_millis(1), Handle::current());
            let c = Arc::clone(&count);
            debouncer.trigger(move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(1)).await;
            debouncer.close();
            let at_close = read();
            tokio::time::sleep(Duration::from_millis(5)).await;
            assert_eq!(read(), at_close);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_rejects_future_triggers() {
        let debouncer = Debouncer::new(DEFAULT_DEBOUNCE, Handle::current());
        let (count, read) = counter();

        let c = Arc::clone(&count);
        debouncer.trigger(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        debouncer.close();

        let c = Arc::clone(&count);
        debouncer.trigger(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert!(debouncer.is_closed());
        assert!(!debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(read(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_action() {
        let (count, read) = counter();
        {
            let debouncer = Debouncer::new(DEFAULT_DEBOUNCE, Handle::current());
            let c = Arc::clone(&count);
            debouncer.trigger(move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
        }
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(read(), 0);
    }
}
