use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use digitizer_core::{LiveState, reduce};
use digitizer_model::DigitizerEvent;
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::channel::{ConnectionState, EventHandler};

/// Handle returned by [`LiveStateStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Arc<dyn Fn(&LiveState) + Send + Sync>;

struct Inner {
    state: Mutex<LiveState>,
    observers: Mutex<Vec<(SubscriptionId, Observer)>>,
    next_id: AtomicU64,
    sender: watch::Sender<LiveState>,
}

/// Shared owner of the console's [`LiveState`].
///
/// Cloning gives another handle to the same state. Reductions are
/// serialized behind one lock; observers run after the lock is released.
#[derive(Clone)]
pub struct LiveStateStore {
    inner: Arc<Inner>,
}

impl fmt::Debug for LiveStateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveStateStore")
            .field("state", &*self.inner.state.lock())
            .field("observers", &self.inner.observers.lock().len())
            .finish()
    }
}

impl LiveStateStore {
    pub fn new() -> Self {
        Self::with_state(LiveState::default())
    }

    pub fn with_state(state: LiveState) -> Self {
        let (sender, _receiver) = watch::channel(state.clone());
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                observers: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
                sender,
            }),
        }
    }

    pub fn snapshot(&self) -> LiveState {
        self.inner.state.lock().clone()
    }

    /// Reduce `event` into the state. Returns whether anything changed.
    pub fn apply(&self, event: &DigitizerEvent) -> bool {
        self.update(|state| reduce(state, event))
    }

    /// Local action mirroring the push channel's open/closed state.
    pub fn set_connected(&self, connected: bool) -> bool {
        self.update(|state| state.clone().with_connected(connected))
    }

    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&LiveState) + Send + Sync + 'static,
    {
        let id =
            SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner.observers.lock().push((id, Arc::new(observer)));
        id
    }

    /// Returns false when `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.inner.observers.lock();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    /// Receiver for async consumers; it sees the latest snapshot only.
    pub fn watch(&self) -> watch::Receiver<LiveState> {
        self.inner.sender.subscribe()
    }

    fn update(&self, f: impl FnOnce(&LiveState) -> LiveState) -> bool {
        let next = {
            let mut state = self.inner.state.lock();
            let next = f(&state);
            if next == *state {
                return false;
            }
            *state = next.clone();
            // Publish under the state lock so watchers never observe
            // snapshots out of order.
            self.inner.sender.send_replace(next.clone());
            next
        };

        let observers: Vec<Observer> = self
            .inner
            .observers
            .lock()
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        for observer in observers {
            observer(&next);
        }
        true
    }
}

impl Default for LiveStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler for LiveStateStore {
    fn handle(&mut self, event: DigitizerEvent) {
        self.apply(&event);
    }

    fn on_connection(&mut self, state: &ConnectionState) {
        self.set_connected(state.is_open());
    }
}
