//! Pull-based live view over a locator.
//!
//! A `LiveQuery` registers an observer that only flips a stale flag (and
//! optionally pings a listener). The owner decides when to `refresh`, which
//! re-runs the query on the calling thread. Dropping the view unsubscribes.

use crate::contract::locator::Locator;
use crate::contract::pet::Pet;
use crate::repo::pet_repo::PetListQuery;
use crate::store::engine::PetStore;
use crate::store::error::StoreResult;
use crate::store::observer::ObserverHandle;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub struct LiveQuery {
    store: Arc<PetStore>,
    locator: Locator,
    query: PetListQuery,
    stale: Arc<AtomicBool>,
    handle: ObserverHandle,
}

impl LiveQuery {
    /// Watches `locator` with default ordering and no filters.
    pub fn new(store: Arc<PetStore>, locator: Locator) -> StoreResult<Self> {
        Self::with_listener(store, locator, PetListQuery::default(), || {})
    }

    /// Watches `locator`; `listener` runs on the notifying thread after the
    /// view is marked stale. It must not mutate the store.
    pub fn with_listener<F>(
        store: Arc<PetStore>,
        locator: Locator,
        query: PetListQuery,
        listener: F,
    ) -> StoreResult<Self>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let stale = Arc::new(AtomicBool::new(true));
        let stale_in_callback = Arc::clone(&stale);
        let handle = store.register_observer(&locator, move || {
            stale_in_callback.store(true, Ordering::SeqCst);
            listener();
        })?;

        Ok(Self {
            store,
            locator,
            query,
            stale,
            handle,
        })
    }

    pub fn locator(&self) -> Locator {
        self.locator
    }

    /// True until the first refresh and after every matching change.
    pub fn is_stale(&self) -> bool {
        self.stale.load(Ordering::SeqCst)
    }

    /// Re-reads the current result set and clears the stale flag.
    pub fn refresh(&self) -> StoreResult<Vec<Pet>> {
        self.stale.store(false, Ordering::SeqCst);
        match self.store.query_with(&self.locator, &self.query) {
            Ok(pets) => Ok(pets),
            Err(err) => {
                self.stale.store(true, Ordering::SeqCst);
                Err(err)
            }
        }
    }
}

impl Drop for LiveQuery {
    fn drop(&mut self) {
        self.store.unsubscribe(self.handle);
    }
}
