use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use super::ProgressEvent;

/// Sink for progress events. Implementations must not block: `publish` is
/// called while the run state is locked.
pub trait ProgressPublisher: Send + Sync {
    fn publish(&self, event: ProgressEvent);
}

pub type ObserverId = u64;

/// Events buffered per observer before it is considered stalled.
pub const OBSERVER_QUEUE_CAPACITY: usize = 10_000;

/// A subscription handle. Events arrive on `receiver` until the observer is
/// unsubscribed, the receiver is dropped, or its queue fills up.
#[derive(Debug)]
pub struct Observer {
    pub id: ObserverId,
    pub receiver: mpsc::Receiver<ProgressEvent>,
}

#[derive(Debug, Default)]
struct RegistryInner {
    next_id: ObserverId,
    observers: BTreeMap<ObserverId, mpsc::Sender<ProgressEvent>>,
}

/// Fan-out publisher with explicit subscribe/unsubscribe. Observers whose
/// receiver is dropped or whose queue is full are removed on publish.
#[derive(Debug)]
pub struct ObserverRegistry {
    capacity: usize,
    inner: Mutex<RegistryInner>,
}

impl Default for ObserverRegistry {
    fn default() -> Self {
        Self::with_capacity(OBSERVER_QUEUE_CAPACITY)
    }
}

impl ObserverRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry whose observers buffer at most `capacity` events
    /// (minimum 1).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(RegistryInner::default()),
        }
    }

    pub fn subscribe(&self) -> Observer {
        let (sender, receiver) = mpsc::channel(self.capacity);
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id = inner.next_id.saturating_add(1);
        inner.observers.insert(id, sender);
        debug!("Progress observer {} subscribed", id);
        Observer { id, receiver }
    }

    /// Removes an observer. Returns `false` when the id is unknown.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let removed = self.lock().observers.remove(&id).is_some();
        if removed {
            debug!("Progress observer {} unsubscribed", id);
        }
        removed
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.lock().observers.len()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ProgressPublisher for ObserverRegistry {
    fn publish(&self, event: ProgressEvent) {
        let mut inner = self.lock();
        inner
            .observers
            .retain(|id, sender| match sender.try_send(event.clone()) {
                Ok(()) => true,
                Err(TrySendError::Closed(_)) => {
                    warn!("Removing closed progress observer {}", id);
                    false
                }
                Err(TrySendError::Full(_)) => {
                    warn!("Removing stalled progress observer {}", id);
                    false
                }
            });
    }
}
