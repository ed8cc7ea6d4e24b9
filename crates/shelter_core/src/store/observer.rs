//! Change notification registry.
//!
//! # Responsibility
//! - Keep callbacks keyed by the locator they watch.
//! - Fan one committed change out to every matching observer exactly once.
//!
//! # Invariants
//! - Callbacks run without the registry lock held, so they may unsubscribe.
//! - Observers fire in registration order.

use crate::contract::locator::Locator;
use crate::contract::pet::PetId;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Payload-free "data changed" callback.
pub type ObserverCallback = Arc<dyn Fn() + Send + Sync>;

/// Handle returned by registration; pass it back to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverHandle(u64);

impl ObserverHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Scope of one committed mutation.
///
/// Every change is also a change to the collection. A collection-wide change
/// (such as deleting everything) touches every item as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    scope: Locator,
}

impl Change {
    pub fn item(id: PetId) -> Self {
        Self {
            scope: Locator::Item(id),
        }
    }

    pub fn collection() -> Self {
        Self {
            scope: Locator::Collection,
        }
    }

    pub fn scope(&self) -> Locator {
        self.scope
    }

    /// Whether an observer watching `watched` must hear about this change.
    pub fn touches(&self, watched: &Locator) -> bool {
        watched.is_collection() || self.scope.is_collection() || *watched == self.scope
    }
}

struct Observer {
    locator: Locator,
    callback: ObserverCallback,
}

#[derive(Default)]
pub struct ObserverRegistry {
    next_id: AtomicU64,
    observers: Mutex<BTreeMap<u64, Observer>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, locator: Locator, callback: ObserverCallback) -> ObserverHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries().insert(id, Observer { locator, callback });
        ObserverHandle(id)
    }

    /// Removes an observer. Returns `false` when it was already gone.
    pub fn unsubscribe(&self, handle: ObserverHandle) -> bool {
        self.entries().remove(&handle.0).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Invokes every observer touched by `change`. Returns how many fired.
    pub fn notify(&self, change: &Change) -> usize {
        let callbacks = self
            .entries()
            .values()
            .filter(|observer| change.touches(&observer.locator))
            .map(|observer| Arc::clone(&observer.callback))
            .collect::<Vec<_>>();

        for callback in &callbacks {
            callback();
        }
        callbacks.len()
    }

    // The map stays consistent even if a holder panicked.
    fn entries(&self) -> MutexGuard<'_, BTreeMap<u64, Observer>> {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
