/*!
 * Context Store
 * One execution context's view of the shared store, with cross-context event delivery
 */

use ahash::RandomState;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::{Arc, Weak};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use super::shared::SharedStore;
use super::traits::StorageAdapter;
use super::types::{StorageError, StorageEvent, StorageListener, StorageResult};
use crate::core::listener::remove_first;
use crate::core::types::ContextId;
use crate::monitoring::NotifySpan;

/// A context ("tab") attached to a [`SharedStore`]
///
/// Writes go straight to the shared map and are broadcast to every other
/// context. Changes made elsewhere queue up on this context's receiver and
/// reach its key listeners when delivered, either by calling
/// [`dispatch_pending`](ContextStore::dispatch_pending) or from a task started
/// with [`spawn_dispatcher`](ContextStore::spawn_dispatcher).
#[derive(Debug)]
pub struct ContextStore {
    id: ContextId,
    address: Option<String>,
    store: SharedStore,
    listeners: DashMap<String, Vec<StorageListener>, RandomState>,
    /// Taken by the dispatcher task once spawned
    receiver: Mutex<Option<broadcast::Receiver<StorageEvent>>>,
}

impl ContextStore {
    pub(super) fn new(store: SharedStore, address: Option<String>) -> Self {
        let receiver = store.subscribe();
        let id = ContextId::new();
        debug!(context = %id, address = ?address, "Context opened");
        Self {
            id,
            address,
            store,
            listeners: DashMap::with_hasher(RandomState::new()),
            receiver: Mutex::new(Some(receiver)),
        }
    }

    /// This context's id
    #[must_use]
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// The store this context belongs to
    #[must_use]
    pub fn shared(&self) -> &SharedStore {
        &self.store
    }

    /// Deliver every change queued by other contexts
    ///
    /// Returns the number of events handed to listeners. Always `0` once a
    /// dispatcher task owns the receiver.
    pub fn dispatch_pending(&self) -> usize {
        let mut pending = Vec::new();
        {
            let mut guard = self.receiver.lock();
            let Some(receiver) = guard.as_mut() else {
                return 0;
            };

            loop {
                match receiver.try_recv() {
                    Ok(event) => pending.push(event),
                    Err(TryRecvError::Lagged(skipped)) => {
                        warn!(context = %self.id, skipped, "Context lagged, dropped change events");
                    }
                    Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                }
            }
        }

        // Lock released: listeners may write or dispatch again
        pending.iter().filter(|event| self.deliver(event)).count()
    }

    /// Deliver changes from a background task on the current tokio runtime
    ///
    /// The task holds only a weak reference and exits at the first event
    /// after the context is dropped.
    pub fn spawn_dispatcher(self: &Arc<Self>) -> StorageResult<JoinHandle<()>> {
        let mut receiver = self
            .receiver
            .lock()
            .take()
            .ok_or(StorageError::DispatcherRunning)?;

        let context: Weak<Self> = Arc::downgrade(self);
        let id = self.id;
        debug!(context = %id, "Spawning event dispatcher");

        Ok(tokio::spawn(async move {
            loop {
                let event = match receiver.recv().await {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(context = %id, skipped, "Dispatcher lagged, dropped change events");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };

                let Some(context) = context.upgrade() else {
                    break;
                };
                context.deliver(&event);
            }
            debug!(context = %id, "Event dispatcher stopped");
        }))
    }

    /// Hand one event to this context's listeners; own writes are skipped
    fn deliver(&self, event: &StorageEvent) -> bool {
        if event.source == self.id {
            return false;
        }

        let listeners: Vec<StorageListener> = self
            .listeners
            .get(&event.key)
            .map(|list| list.value().clone())
            .unwrap_or_default();

        trace!(
            context = %self.id,
            source = %event.source,
            key = %event.key,
            "Delivering change event"
        );

        let notify = NotifySpan::new("remote", &event.key, listeners.len());
        let _entered = notify.enter();
        for listener in &listeners {
            listener.call(
                event.new_value.as_ref(),
                event.old_value.as_ref(),
                event.url.as_deref(),
            );
        }
        true
    }
}

impl StorageAdapter for ContextStore {
    fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        self.store.get(key)
    }

    fn set(&self, key: &str, value: &Value) -> StorageResult<()> {
        self.store
            .insert(key, value, self.id, self.address.as_deref())?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.store.delete(key, self.id, self.address.as_deref())?;
        Ok(())
    }

    fn on(&self, key: &str, listener: StorageListener) {
        self.listeners
            .entry(key.to_string())
            .or_default()
            .push(listener);
        trace!(context = %self.id, key, "Listener registered");
    }

    fn off(&self, key: &str, listener: &StorageListener) -> bool {
        let removed = self
            .listeners
            .get_mut(key)
            .is_some_and(|mut list| remove_first(list.value_mut(), listener));
        if removed {
            trace!(context = %self.id, key, "Listener removed");
        }
        removed
    }

    fn listener_count(&self, key: &str) -> usize {
        self.listeners.get(key).map_or(0, |list| list.len())
    }

    fn address(&self) -> Option<String> {
        self.address.clone()
    }
}
