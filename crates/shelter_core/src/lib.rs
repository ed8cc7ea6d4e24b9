//! Core storage layer for the shelter pet catalog.
//! This crate is the single source of truth for record invariants.

pub mod config;
pub mod contract;
pub mod db;
pub mod logging;
pub mod repo;
pub mod store;

pub use config::{StorageLocation, StoreConfig, DATABASE_NAME};
pub use contract::locator::{
    collection_locator, item_locator, parse_item_id, Locator, LocatorError,
};
pub use contract::pet::{
    validate_for_insert, validate_for_update, Gender, NewPet, Pet, PetFields, PetId, PetPatch,
    PetValidationError,
};
pub use db::schema::SCHEMA_VERSION;
pub use db::{OpenOutcome, SchemaState};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use repo::pet_repo::PetListQuery;
pub use store::engine::PetStore;
pub use store::error::{StorageFailure, StoreError, StoreResult};
pub use store::live::LiveQuery;
pub use store::observer::ObserverHandle;

