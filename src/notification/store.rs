use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::NotificationConfig;

use super::{NotificationContent, NotificationKind, NotificationState};

/// Callback receiving the current state at subscription time and on every
/// subsequent change
type Observer = Arc<dyn Fn(&NotificationState) + Send + Sync>;

struct ObserverEntry {
    id: Uuid,
    observer: Observer,
}

/// Statistics for the notification store
#[derive(Debug, Default)]
struct StoreStats {
    /// Total notifications triggered
    total_triggered: AtomicU64,
    /// Total auto-hide actions that actually hid a notification
    total_auto_hidden: AtomicU64,
    /// Total observer callback invocations
    total_deliveries: AtomicU64,
}

/// Snapshot of store statistics
#[derive(Debug, Clone, Serialize)]
pub struct StoreStatsSnapshot {
    pub total_triggered: u64,
    pub total_auto_hidden: u64,
    pub total_deliveries: u64,
}

/// Current state plus the trigger epoch it belongs to.
///
/// The epoch ties each scheduled auto-hide to the trigger call that scheduled
/// it: a hide only applies while its epoch is still current, so a stale hide
/// that raced past its sleep can never dismiss a newer notification.
struct CurrentState {
    state: NotificationState,
    epoch: u64,
}

struct StoreInner {
    current: Mutex<CurrentState>,
    observers: Mutex<Vec<ObserverEntry>>,
    pending_hide: Mutex<Option<(u64, JoinHandle<()>)>>,
    auto_hide_delay: Duration,
    stats: StoreStats,
}

/// Shared observable container for the current toast notification.
///
/// Holds at most one notification at a time; a new trigger replaces the
/// previous one outright (no queueing, no stacking). State replacement and
/// observer fan-out happen synchronously inside [`trigger`]; the auto-hide is
/// a deferred Tokio task the caller never waits on. Exactly one auto-hide is
/// pending at any time: a new trigger cancels and replaces the previous one,
/// so every notification gets a full visibility window.
///
/// The store is cheaply cloneable (clones share state) and is meant to be
/// passed explicitly to whatever needs it rather than living in a global.
///
/// [`trigger`]: NotificationStore::trigger
#[derive(Clone)]
pub struct NotificationStore {
    inner: Arc<StoreInner>,
}

/// Deregistration handle returned by [`NotificationStore::subscribe`].
///
/// Dropping the handle without calling [`unsubscribe`] keeps the observer
/// registered for the lifetime of the store.
///
/// [`unsubscribe`]: Subscription::unsubscribe
pub struct Subscription {
    inner: Weak<StoreInner>,
    id: Uuid,
}

impl Subscription {
    /// Stop delivering state changes to this observer
    pub fn unsubscribe(self) {
        if let Some(inner) = self.inner.upgrade() {
            lock(&inner.observers).retain(|entry| entry.id != self.id);
            tracing::debug!(subscription_id = %self.id, "Observer unsubscribed");
        }
    }
}

impl NotificationStore {
    /// Create a store with the default 3 second auto-hide delay
    pub fn new() -> Self {
        Self::with_auto_hide(Duration::from_millis(3000))
    }

    /// Create a store with a custom auto-hide delay
    pub fn with_auto_hide(delay: Duration) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                current: Mutex::new(CurrentState {
                    state: NotificationState::hidden(),
                    epoch: 0,
                }),
                observers: Mutex::new(Vec::new()),
                pending_hide: Mutex::new(None),
                auto_hide_delay: delay,
                stats: StoreStats::default(),
            }),
        }
    }

    /// Create a store from settings
    pub fn from_config(config: &NotificationConfig) -> Self {
        Self::with_auto_hide(Duration::from_millis(config.auto_hide_ms))
    }

    /// Register an observer.
    ///
    /// The observer is invoked synchronously with the current state before
    /// this call returns, then again on every subsequent change, after all
    /// observers registered earlier.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&NotificationState) + Send + Sync + 'static,
    {
        let id = Uuid::new_v4();
        let observer: Observer = Arc::new(observer);
        lock(&self.inner.observers).push(ObserverEntry {
            id,
            observer: observer.clone(),
        });

        // Initial delivery, so a late subscriber never misses the current state
        let state = lock(&self.inner.current).state.clone();
        observer.as_ref()(&state);
        self.inner.stats.total_deliveries.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(subscription_id = %id, "Observer subscribed");

        Subscription {
            inner: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Display a notification and schedule its auto-hide.
    ///
    /// Replaces the current state with `{show: true, content, kind}` and
    /// notifies all observers before returning. The auto-hide fires after the
    /// store's delay, flipping `show` to false while keeping `content` and
    /// `kind` intact. Triggering again before the delay elapses replaces the
    /// notification and restarts the window.
    ///
    /// Must be called from within a Tokio runtime; the auto-hide task is
    /// spawned onto it.
    pub fn trigger(&self, content: NotificationContent, kind: NotificationKind) {
        let (state, epoch) = {
            let mut current = lock(&self.inner.current);
            current.epoch += 1;
            current.state = NotificationState {
                show: true,
                content,
                kind,
            };
            (current.state.clone(), current.epoch)
        };

        self.inner.stats.total_triggered.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            kind = ?kind,
            title = state.content.title.as_deref().unwrap_or(""),
            "Notification triggered"
        );

        self.schedule_auto_hide(epoch);
        self.inner.notify_observers(&state);
    }

    /// [`trigger`] with the default kind ([`NotificationKind::Info`])
    ///
    /// [`trigger`]: NotificationStore::trigger
    pub fn notify(&self, content: NotificationContent) {
        self.trigger(content, NotificationKind::default());
    }

    /// Display a success toast with just a message
    pub fn success(&self, message: impl Into<String>) {
        self.trigger(NotificationContent::new(message), NotificationKind::Success);
    }

    /// Display an error toast with just a message
    pub fn error(&self, message: impl Into<String>) {
        self.trigger(NotificationContent::new(message), NotificationKind::Error);
    }

    /// Display an info toast with just a message
    pub fn info(&self, message: impl Into<String>) {
        self.trigger(NotificationContent::new(message), NotificationKind::Info);
    }

    /// Snapshot of the current state
    pub fn state(&self) -> NotificationState {
        lock(&self.inner.current).state.clone()
    }

    /// Number of registered observers
    pub fn observer_count(&self) -> usize {
        lock(&self.inner.observers).len()
    }

    /// Get store statistics
    pub fn stats(&self) -> StoreStatsSnapshot {
        StoreStatsSnapshot {
            total_triggered: self.inner.stats.total_triggered.load(Ordering::Relaxed),
            total_auto_hidden: self.inner.stats.total_auto_hidden.load(Ordering::Relaxed),
            total_deliveries: self.inner.stats.total_deliveries.load(Ordering::Relaxed),
        }
    }

    /// Replace the pending auto-hide with one for the given epoch
    fn schedule_auto_hide(&self, epoch: u64) {
        let delay = self.inner.auto_hide_delay;
        let weak = Arc::downgrade(&self.inner);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                inner.auto_hide(epoch);
            }
        });

        // Abort still cancels a sleeping task; the epoch check covers one
        // that already woke up. If a newer trigger raced in first, its hide
        // supersedes this one.
        let mut pending = lock(&self.inner.pending_hide);
        match pending.as_ref() {
            Some((current, _)) if *current > epoch => handle.abort(),
            _ => {
                if let Some((_, previous)) = pending.replace((epoch, handle)) {
                    previous.abort();
                }
            }
        }
    }
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreInner {
    /// Hide the notification if the triggering call is still the current one
    fn auto_hide(&self, epoch: u64) {
        let state = {
            let mut current = lock(&self.current);
            if current.epoch != epoch {
                tracing::debug!(epoch, current_epoch = current.epoch, "Stale auto-hide discarded");
                return;
            }
            current.state.show = false;
            current.state.clone()
        };

        self.stats.total_auto_hidden.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("Notification auto-hidden");
        self.notify_observers(&state);
    }

    /// Fan the state out to all observers, in registration order.
    ///
    /// Observers are invoked outside the registry lock so a callback may
    /// subscribe, unsubscribe, or trigger without deadlocking.
    fn notify_observers(&self, state: &NotificationState) {
        let observers: Vec<Observer> = lock(&self.observers)
            .iter()
            .map(|entry| entry.observer.clone())
            .collect();

        for observer in &observers {
            observer.as_ref()(state);
        }
        self.stats
            .total_deliveries
            .fetch_add(observers.len() as u64, Ordering::Relaxed);
    }
}

/// Lock a mutex, recovering the guard if a panicking observer poisoned it
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    fn recording_observer() -> (Arc<StdMutex<Vec<NotificationState>>>, impl Fn(&NotificationState) + Send + Sync + 'static)
    {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |state: &NotificationState| {
            sink.lock().unwrap().push(state.clone());
        })
    }

    #[tokio::test]
    async fn test_trigger_updates_state_synchronously() {
        let store = NotificationStore::new();
        store.trigger(NotificationContent::new("m"), NotificationKind::Error);

        let state = store.state();
        assert!(state.show);
        assert_eq!(state.content.message, "m");
        assert_eq!(state.kind, NotificationKind::Error);
    }

    #[tokio::test]
    async fn test_subscribe_delivers_current_state_immediately() {
        let store = NotificationStore::new();
        store.success("done");

        let (seen, observer) = recording_observer();
        let _sub = store.subscribe(observer);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].show);
        assert_eq!(seen[0].content.message, "done");
        assert_eq!(seen[0].kind, NotificationKind::Success);
    }

    #[tokio::test]
    async fn test_observers_notified_in_registration_order() {
        let store = NotificationStore::new();
        let order = Arc::new(StdMutex::new(Vec::new()));

        let first = order.clone();
        let _a = store.subscribe(move |_| first.lock().unwrap().push("a"));
        let second = order.clone();
        let _b = store.subscribe(move |_| second.lock().unwrap().push("b"));

        order.lock().unwrap().clear();
        store.info("hello");

        assert_eq!(*order.lock().unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let store = NotificationStore::new();
        let (seen, observer) = recording_observer();
        let sub = store.subscribe(observer);
        assert_eq!(store.observer_count(), 1);

        sub.unsubscribe();
        assert_eq!(store.observer_count(), 0);

        store.info("ignored");
        // Only the initial delivery was seen
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_second_trigger_replaces_content_synchronously() {
        let store = NotificationStore::new();
        let (seen, observer) = recording_observer();
        let _sub = store.subscribe(observer);

        store.trigger(NotificationContent::new("first"), NotificationKind::Info);
        store.trigger(NotificationContent::new("second"), NotificationKind::Error);

        let seen = seen.lock().unwrap();
        // Initial delivery + two triggers
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[2].content.message, "second");
        assert_eq!(seen[2].kind, NotificationKind::Error);
        assert_eq!(store.state().content.message, "second");
    }

    #[tokio::test]
    async fn test_notify_defaults_to_info() {
        let store = NotificationStore::new();
        store.notify(NotificationContent::new("m"));
        assert_eq!(store.state().kind, NotificationKind::Info);
    }

    #[tokio::test]
    async fn test_stats_counters() {
        let store = NotificationStore::new();
        let (_seen, observer) = recording_observer();
        let _sub = store.subscribe(observer);

        store.info("one");
        store.info("two");

        let stats = store.stats();
        assert_eq!(stats.total_triggered, 2);
        // Initial delivery + one per trigger
        assert_eq!(stats.total_deliveries, 3);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = NotificationStore::new();
        let clone = store.clone();

        store.error("boom");
        assert_eq!(clone.state().content.message, "boom");
        assert_eq!(clone.state().kind, NotificationKind::Error);
    }
}
