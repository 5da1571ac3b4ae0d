//! Resize observation and the debounced re-fit subscription.
//!
//! `ResizeSource` is the capability the fit engine needs from its platform:
//! `subscribe(target, on_change) -> Subscription`. `ResizeBus` implements it
//! in-process; display clients push their viewport and container sizes into
//! the bus over HTTP and every subscriber of that target is notified.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, trace};

use crate::layout::debounce::Debouncer;
use crate::layout::probe::Size;

/// What a subscription observes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "camelCase")]
pub enum ResizeTarget {
    Viewport,
    Container(String),
    Element(String),
}

pub type ResizeCallback = Arc<dyn Fn(Size) + Send + Sync>;

pub trait ResizeSource: Send + Sync {
    fn subscribe(&self, target: ResizeTarget, on_change: ResizeCallback) -> Subscription;
}

/// Live subscription. Detaches on `unsubscribe` or drop; detaching twice is a no-op.
#[must_use = "dropping a Subscription detaches it immediately"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(detach: impl FnOnce() + Send + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.detach_now();
    }

    fn detach_now(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach_now();
    }
}

// ────────────────────────────────────────────────────────────────────────────
// ResizeBus
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct BusInner {
    next_id: u64,
    listeners: HashMap<ResizeTarget, Vec<(u64, ResizeCallback)>>,
    sizes: HashMap<ResizeTarget, Size>,
}

/// In-process resize notifier. Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct ResizeBus {
    inner: Arc<Mutex<BusInner>>,
}

impl ResizeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new size for `target` and notifies its subscribers when the
    /// size actually changed. Returns how many callbacks ran.
    pub fn resize(&self, target: ResizeTarget, size: Size) -> usize {
        let callbacks: Vec<ResizeCallback> = {
            let mut inner = self.inner.lock();
            if inner.sizes.get(&target) == Some(&size) {
                trace!(?target, "resize ignored, size unchanged");
                return 0;
            }
            inner.sizes.insert(target.clone(), size);
            inner
                .listeners
                .get(&target)
                .map(|list| list.iter().map(|(_, cb)| Arc::clone(cb)).collect())
                .unwrap_or_default()
        };

        debug!(?target, width = size.width, height = size.height, listeners = callbacks.len(), "resize");
        for callback in &callbacks {
            callback(size);
        }
        callbacks.len()
    }

    /// Last size recorded for `target`.
    pub fn size(&self, target: &ResizeTarget) -> Option<Size> {
        self.inner.lock().sizes.get(target).copied()
    }

    pub fn listener_count(&self, target: &ResizeTarget) -> usize {
        self.inner
            .lock()
            .listeners
            .get(target)
            .map_or(0, Vec::len)
    }
}

impl ResizeSource for ResizeBus {
    fn subscribe(&self, target: ResizeTarget, on_change: ResizeCallback) -> Subscription {
        let id = {
            let mut inner = self.inner.lock();
            inner.next_id += 1;
            let id = inner.next_id;
            inner
                .listeners
                .entry(target.clone())
                .or_default()
                .push((id, on_change));
            id
        };

        let inner = Arc::clone(&self.inner);
        Subscription::new(move || {
            let mut inner = inner.lock();
            if let Some(list) = inner.listeners.get_mut(&target) {
                list.retain(|(listener, _)| *listener != id);
                if list.is_empty() {
                    inner.listeners.remove(&target);
                }
            }
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Debounced re-fit
// ────────────────────────────────────────────────────────────────────────────

/// Handle to an active `observe_and_refit` subscription.
#[must_use = "dropping a FitObservation tears it down immediately"]
pub struct FitObservation {
    subscriptions: Vec<Subscription>,
    debouncer: Arc<Debouncer>,
}

impl FitObservation {
    /// Detaches all observers and clears pending debounced work.
    pub fn unsubscribe(self) {
        drop(self);
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }
}

impl Drop for FitObservation {
    fn drop(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
        self.debouncer.close();
    }
}

/// Runs `refit` once now, then again (debounced) whenever the container, the
/// element, or the viewport is resized. `refit` reads whatever inputs are
/// current when the debounce timer fires.
pub fn observe_and_refit<S, F>(
    source: &S,
    container: ResizeTarget,
    element: ResizeTarget,
    debouncer: Debouncer,
    refit: F,
) -> FitObservation
where
    S: ResizeSource + ?Sized,
    F: Fn() + Send + Sync + 'static,
{
    let refit = Arc::new(refit);
    let debouncer = Arc::new(debouncer);

    let subscriptions = [container, element, ResizeTarget::Viewport]
        .into_iter()
        .map(|target| {
            let debouncer = Arc::clone(&debouncer);
            let refit = Arc::clone(&refit);
            let on_change: ResizeCallback = Arc::new(move |_size| {
                let refit = Arc::clone(&refit);
                debouncer.trigger(move || refit());
            });
            source.subscribe(target, on_change)
        })
        .collect();

    refit();

    FitObservation {
        subscriptions,
        debouncer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::runtime::Handle;

    use crate::layout::debounce::DEFAULT_DEBOUNCE;

    fn container() -> ResizeTarget {
        ResizeTarget::Container("timer".to_string())
    }

    fn element() -> ResizeTarget {
        ResizeTarget::Element("timer".to_string())
    }

    /// Starts an observation whose refit records the container size it saw.
    fn observe(bus: &ResizeBus) -> (FitObservation, Arc<AtomicUsize>, Arc<Mutex<Vec<Option<Size>>>>) {
        let runs = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let observation = {
            let runs = Arc::clone(&runs);
            let seen = Arc::clone(&seen);
            let reader = bus.clone();
            observe_and_refit(
                bus,
                container(),
                element(),
                Debouncer::new(DEFAULT_DEBOUNCE, Handle::current()),
                move || {
                    runs.fetch_add(1, Ordering::SeqCst);
                    seen.lock().push(reader.size(&container()));
                },
            )
        };
        (observation, runs, seen)
    }

    #[test]
    fn test_bus_notifies_only_on_change() {
        let bus = ResizeBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let _sub = bus.subscribe(
            ResizeTarget::Viewport,
            Arc::new(move |_| {
                h.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert_eq!(bus.resize(ResizeTarget::Viewport, Size::new(800, 600)), 1);
        assert_eq!(bus.resize(ResizeTarget::Viewport, Size::new(800, 600)), 0);
        assert_eq!(bus.resize(container(), Size::new(10, 10)), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(bus.size(&ResizeTarget::Viewport), Some(Size::new(800, 600)));
    }

    #[test]
    fn test_subscription_detaches_on_drop() {
        let bus = ResizeBus::new();
        let sub = bus.subscribe(container(), Arc::new(|_| {}));
        assert_eq!(bus.listener_count(&container()), 1);
        drop(sub);
        assert_eq!(bus.listener_count(&container()), 0);
        assert_eq!(bus.resize(container(), Size::new(1, 1)), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_refit_runs_immediately() {
        let bus = ResizeBus::new();
        let (_observation, runs, _) = observe(&bus);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resize_storm_yields_one_refit_with_latest_size() {
        let bus = ResizeBus::new();
        let (_observation, runs, seen) = observe(&bus);
        let before = runs.load(Ordering::SeqCst);

        for i in 1..=10u32 {
            bus.resize(container(), Size::new(100 + i, 50 + i));
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(runs.load(Ordering::SeqCst) - before, 1);
        assert_eq!(seen.lock().last().copied().flatten(), Some(Size::new(110, 60)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_target_triggers_refit() {
        let bus = ResizeBus::new();
        let (_observation, runs, _) = observe(&bus);

        for target in [container(), element(), ResizeTarget::Viewport] {
            let before = runs.load(Ordering::SeqCst);
            bus.resize(target, Size::new(640, 480));
            tokio::time::sleep(Duration::from_millis(150)).await;
            assert_eq!(runs.load(Ordering::SeqCst) - before, 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_refit_after_unsubscribe() {
        let bus = ResizeBus::new();
        let (observation, runs, _) = observe(&bus);
        let before = runs.load(Ordering::SeqCst);

        observation.unsubscribe();
        assert_eq!(bus.listener_count(&container()), 0);
        assert_eq!(bus.listener_count(&ResizeTarget::Viewport), 0);

        bus.resize(container(), Size::new(300, 100));
        bus.resize(ResizeTarget::Viewport, Size::new(1920, 1080));
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(runs.load(Ordering::SeqCst), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsubscribe_clears_pending_refit() {
        let bus = ResizeBus::new();
        let (observation, runs, _) = observe(&bus);
        let before = runs.load(Ordering::SeqCst);

        bus.resize(container(), Size::new(300, 100));
        assert!(observation.is_pending());
        observation.unsubscribe();

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(runs.load(Ordering::SeqCst), before);
    }
}
