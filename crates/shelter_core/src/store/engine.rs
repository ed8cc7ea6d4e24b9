//! Pet store engine.
//!
//! # Responsibility
//! - Own the storage connection and drive the schema lifecycle.
//! - Route locator-addressed CRUD calls to the repository.
//! - Announce committed changes to registered observers.
//!
//! # Invariants
//! - CRUD is served only in `SchemaState::Ready`.
//! - One lock serializes every storage access and lifecycle transition, so
//!   readers never observe a partially applied write.
//! - Each notifying commit takes a ticket under the storage lock; deliveries
//!   run in ticket order, after commit, without the storage lock held.
//! - Observer callbacks may query the store. A mutation issued from inside a
//!   callback is refused before it touches storage.

use crate::config::StoreConfig;
use crate::contract::locator::{parse_item_id, Locator};
use crate::contract::pet::{validate_for_insert, validate_for_update, Pet, PetFields, PetId};
use crate::db::schema::{self, SchemaPlan};
use crate::db::{open_connection, DbError, OpenOutcome, SchemaState};
use crate::repo::pet_repo::{PetListQuery, PetRepository, SqlitePetRepository};
use crate::store::error::{StorageFailure, StoreError, StoreResult};
use crate::store::observer::{Change, ObserverHandle, ObserverRegistry};
use log::{debug, error, info, warn};
use rusqlite::Connection;
use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(0);

thread_local! {
    /// Stores whose observers are running on this thread.
    static DELIVERING: RefCell<Vec<u64>> = const { RefCell::new(Vec::new()) };
}

struct Storage {
    state: SchemaState,
    conn: Option<Connection>,
    /// Tickets handed to notifying commits so far.
    commits: u64,
}

impl Storage {
    fn ready_connection(&self) -> StoreResult<&Connection> {
        match (&self.state, &self.conn) {
            (SchemaState::Ready, Some(conn)) => Ok(conn),
            (state, _) => Err(StoreError::not_ready(*state)),
        }
    }
}

/// Locator-addressed pet store with change notification.
///
/// Constructed once, opened explicitly, closed explicitly. Share it across
/// threads with `Arc`.
pub struct PetStore {
    id: u64,
    config: StoreConfig,
    storage: Mutex<Storage>,
    /// Ticket whose notification is delivered next.
    delivery: Mutex<u64>,
    turn: Condvar,
    observers: ObserverRegistry,
}

/// Holds the delivery turn; passes it on even if a callback panics.
struct Turn<'a> {
    next: MutexGuard<'a, u64>,
    turn: &'a Condvar,
}

impl Drop for Turn<'_> {
    fn drop(&mut self) {
        *self.next += 1;
        self.turn.notify_all();
    }
}

/// Marks this thread as running observers of one store until dropped.
struct Delivering(u64);

impl Delivering {
    fn enter(store: u64) -> Self {
        DELIVERING.with(|stores| stores.borrow_mut().push(store));
        Self(store)
    }

    fn active(store: u64) -> bool {
        DELIVERING.with(|stores| stores.borrow().contains(&store))
    }
}

impl Drop for Delivering {
    fn drop(&mut self) {
        DELIVERING.with(|stores| {
            let mut stores = stores.borrow_mut();
            if let Some(index) = stores.iter().rposition(|store| *store == self.0) {
                stores.remove(index);
            }
        });
    }
}

impl PetStore {
    /// Creates an unopened store in state `Absent`.
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        Ok(Self {
            id: NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed),
            config,
            storage: Mutex::new(Storage {
                state: SchemaState::Absent,
                conn: None,
                commits: 0,
            }),
            delivery: Mutex::new(0),
            turn: Condvar::new(),
            observers: ObserverRegistry::new(),
        })
    }

    /// Creates and opens a store in one step.
    pub fn connect(config: StoreConfig) -> StoreResult<Self> {
        let store = Self::new(config)?;
        store.open()?;
        Ok(store)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Current lifecycle state. A poisoned lock reads as `Fatal`.
    pub fn state(&self) -> SchemaState {
        self.storage
            .lock()
            .map(|storage| storage.state)
            .unwrap_or(SchemaState::Fatal)
    }

    /// Attaches storage and brings the schema to the configured version.
    ///
    /// Opening a `Ready` store is a no-op. A failure while creating or
    /// upgrading leaves the store `Fatal` for good.
    ///
    /// # Side effects
    /// - Creates the storage file when missing.
    /// - Drops all rows when the stamped version is older than configured.
    pub fn open(&self) -> StoreResult<OpenOutcome> {
        let mut storage = self.lock_storage()?;
        let target = self.config.schema_version;
        match storage.state {
            SchemaState::Ready => return Ok(OpenOutcome::Opened { version: target }),
            SchemaState::Absent | SchemaState::Closed => {}
            state => return Err(StoreError::not_ready(state)),
        }

        let started_at = Instant::now();
        match bootstrap(&mut storage, &self.config) {
            Ok((conn, outcome)) => {
                storage.conn = Some(conn);
                storage.state = SchemaState::Ready;
                info!(
                    "event=store_open module=store status=ok outcome={} version={target} duration_ms={}",
                    outcome_label(&outcome),
                    started_at.elapsed().as_millis()
                );
                Ok(outcome)
            }
            Err(err) => {
                let phase = storage.state;
                storage.conn = None;
                storage.state = SchemaState::Fatal;
                error!(
                    "event=store_open module=store status=error phase={phase} version={target} duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err.into())
            }
        }
    }

    /// Releases the storage connection. Operations fail until reopened.
    ///
    /// Closing a `Fatal` store keeps it `Fatal`.
    pub fn close(&self) -> StoreResult<()> {
        let mut storage = self.lock_storage()?;
        let Some(conn) = storage.conn.take() else {
            if storage.state != SchemaState::Fatal {
                storage.state = SchemaState::Closed;
            }
            return Ok(());
        };
        storage.state = SchemaState::Closed;
        if let Err((_, err)) = conn.close() {
            warn!("event=store_close module=store status=error error={err}");
            return Err(DbError::from(err).into());
        }
        info!("event=store_close module=store status=ok");
        Ok(())
    }

    /// Inserts one pet into the collection and returns its item locator.
    pub fn insert(&self, locator: &Locator, fields: &PetFields) -> StoreResult<Locator> {
        if !locator.is_collection() {
            return Err(StoreError::InvalidIdentifier(locator.to_string()));
        }
        let id = self.mutate(|repo| {
            let pet = validate_for_insert(fields)?;
            let id = repo.insert_pet(&pet)?;
            Ok((id, Some(Change::item(id))))
        })?;
        debug!("event=pet_insert module=store status=ok locator=pets/{id}");
        Ok(Locator::Item(id))
    }

    /// Reads the collection in ascending id order, or one item.
    ///
    /// Each call is a fresh read; the returned rows never change afterwards.
    pub fn query(&self, locator: &Locator) -> StoreResult<Vec<Pet>> {
        self.query_with(locator, &PetListQuery::default())
    }

    /// Reads with simple filters. Only `gender` applies to item locators.
    pub fn query_with(&self, locator: &Locator, query: &PetListQuery) -> StoreResult<Vec<Pet>> {
        let locator = checked(locator)?;
        let storage = self.lock_storage()?;
        let repo = SqlitePetRepository::new(storage.ready_connection()?);
        let pets = match locator {
            Locator::Collection => repo.list_pets(query)?,
            Locator::Item(id) => repo
                .get_pet(id)?
                .into_iter()
                .filter(|pet| query.matches(pet))
                .collect(),
        };
        debug!(
            "event=pet_query module=store status=ok locator={locator} rows={}",
            pets.len()
        );
        Ok(pets)
    }

    /// Reads the single record behind an item locator.
    pub fn query_one(&self, locator: &Locator) -> StoreResult<Option<Pet>> {
        let id = item_id(locator)?;
        let storage = self.lock_storage()?;
        let repo = SqlitePetRepository::new(storage.ready_connection()?);
        Ok(repo.get_pet(id)?)
    }

    /// Applies a partial update to one pet. Returns the affected count.
    pub fn update(&self, locator: &Locator, fields: &PetFields) -> StoreResult<usize> {
        let id = item_id(locator)?;
        let changed = self.mutate(|repo| {
            let patch = validate_for_update(fields)?;
            let changed = repo.update_pet(id, &patch)?;
            Ok((changed, (changed > 0).then(|| Change::item(id))))
        })?;
        debug!("event=pet_update module=store status=ok locator={locator} affected={changed}");
        Ok(changed)
    }

    /// Deletes one pet, or all pets for the collection locator.
    pub fn delete(&self, locator: &Locator) -> StoreResult<usize> {
        let locator = checked(locator)?;
        let deleted = self.mutate(|repo| {
            let (deleted, change) = match locator {
                Locator::Collection => (repo.delete_all_pets()?, Change::collection()),
                Locator::Item(id) => (repo.delete_pet(id)?, Change::item(id)),
            };
            Ok((deleted, (deleted > 0).then_some(change)))
        })?;
        debug!("event=pet_delete module=store status=ok locator={locator} affected={deleted}");
        Ok(deleted)
    }

    pub fn count(&self) -> StoreResult<u64> {
        let storage = self.lock_storage()?;
        let repo = SqlitePetRepository::new(storage.ready_connection()?);
        Ok(repo.count_pets()?)
    }

    /// Subscribes `callback` to changes touching `locator`.
    ///
    /// Collection observers hear every committed change. Item observers hear
    /// changes to their item and collection-wide deletes.
    pub fn register_observer<F>(&self, locator: &Locator, callback: F) -> StoreResult<ObserverHandle>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let locator = checked(locator)?;
        self.lock_storage()?.ready_connection()?;
        Ok(self.observers.register(locator, Arc::new(callback)))
    }

    /// Removes an observer. Idempotent; returns whether it was still present.
    pub fn unsubscribe(&self, handle: ObserverHandle) -> bool {
        self.observers.unsubscribe(handle)
    }

    /// Number of live observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Runs one write under the storage lock, then notifies in commit order.
    ///
    /// Refused from inside one of this store's callbacks: the write would
    /// wait for a delivery turn its own thread holds.
    fn mutate<T, F>(&self, write: F) -> StoreResult<T>
    where
        F: FnOnce(&SqlitePetRepository<'_>) -> StoreResult<(T, Option<Change>)>,
    {
        if Delivering::active(self.id) {
            warn!("event=store_mutate module=store status=rejected reason=reentrant");
            return Err(StoreError::StorageUnavailable(StorageFailure::Reentrant));
        }
        let mut storage = self.lock_storage()?;
        let repo = SqlitePetRepository::new(storage.ready_connection()?);
        let (value, change) = write(&repo)?;
        let Some(change) = change else {
            return Ok(value);
        };
        let ticket = storage.commits;
        storage.commits += 1;
        drop(storage);

        self.deliver(ticket, &change);
        Ok(value)
    }

    fn deliver(&self, ticket: u64, change: &Change) {
        let next = self
            .delivery
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let next = self
            .turn
            .wait_while(next, |next| *next != ticket)
            .unwrap_or_else(PoisonError::into_inner);
        let _turn = Turn {
            next,
            turn: &self.turn,
        };
        let _delivering = Delivering::enter(self.id);

        let fired = self.observers.notify(change);
        debug!(
            "event=store_notify module=store status=ok scope={} ticket={ticket} observers={fired}",
            change.scope()
        );
    }

    fn lock_storage(&self) -> StoreResult<MutexGuard<'_, Storage>> {
        self.storage
            .lock()
            .map_err(|_| StoreError::StorageUnavailable(StorageFailure::LockPoisoned))
    }
}

/// Runs the lifecycle state machine, recording each phase in `storage`.
fn bootstrap(storage: &mut Storage, config: &StoreConfig) -> Result<(Connection, OpenOutcome), DbError> {
    let target = config.schema_version;
    let mut conn = open_connection(&config.location)?;
    let stamped = schema::stamped_version(&conn)?;

    let outcome = match schema::plan(stamped, target)? {
        SchemaPlan::Create => {
            storage.state = SchemaState::Creating;
            schema::create(&mut conn, target)?;
            OpenOutcome::Created { version: target }
        }
        SchemaPlan::Upgrade { from } => {
            storage.state = SchemaState::Upgrading;
            schema::upgrade(&mut conn, from, target)?;
            OpenOutcome::Upgraded { from, to: target }
        }
        SchemaPlan::UpToDate => OpenOutcome::Opened { version: target },
    };
    Ok((conn, outcome))
}

/// Rejects item locators built directly around a negative id.
fn checked(locator: &Locator) -> StoreResult<Locator> {
    match locator {
        Locator::Item(id) if *id < 0 => Err(StoreError::InvalidIdentifier(id.to_string())),
        _ => Ok(*locator),
    }
}

fn item_id(locator: &Locator) -> StoreResult<PetId> {
    let locator = checked(locator)?;
    parse_item_id(&locator).map_err(|_| StoreError::NotAnItemLocator(locator))
}

fn outcome_label(outcome: &OpenOutcome) -> &'static str {
    match outcome {
        OpenOutcome::Created { .. } => "created",
        OpenOutcome::Upgraded { .. } => "upgraded",
        OpenOutcome::Opened { .. } => "opened",
    }
}
