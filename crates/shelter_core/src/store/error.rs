//! Error taxonomy surfaced by the pet store.

use crate::config::ConfigError;
use crate::contract::locator::{Locator, LocatorError};
use crate::contract::pet::PetValidationError;
use crate::db::{DbError, SchemaState};
use crate::repo::pet_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by `PetStore` operations.
///
/// A missing record is not an error: it shows up as an affected count of 0
/// or an empty result.
#[derive(Debug)]
pub enum StoreError {
    /// Payload failed validation. Nothing was written.
    InvalidRecord(PetValidationError),
    /// Malformed or negative id, or a locator the operation cannot target.
    InvalidIdentifier(String),
    /// An item-only operation received the given locator.
    NotAnItemLocator(Locator),
    /// The store is not `Ready` or the storage medium failed.
    StorageUnavailable(StorageFailure),
    InvalidConfig(ConfigError),
}

/// Cause behind `StoreError::StorageUnavailable`.
#[derive(Debug)]
pub enum StorageFailure {
    NotReady(SchemaState),
    Db(DbError),
    /// A persisted row violates the record contract.
    InvalidData(String),
    LockPoisoned,
    /// A mutation was issued from inside a change notification.
    Reentrant,
}

impl StoreError {
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }

    pub(crate) fn not_ready(state: SchemaState) -> Self {
        Self::StorageUnavailable(StorageFailure::NotReady(state))
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRecord(err) => write!(f, "invalid record: {err}"),
            Self::InvalidIdentifier(value) => write!(f, "invalid identifier: `{value}`"),
            Self::NotAnItemLocator(locator) => {
                write!(f, "operation requires an item locator, got `{locator}`")
            }
            Self::StorageUnavailable(failure) => write!(f, "storage unavailable: {failure}"),
            Self::InvalidConfig(err) => write!(f, "invalid store config: {err}"),
        }
    }
}

impl Display for StorageFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotReady(state) => write!(f, "store is {state}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted pet data: {message}"),
            Self::LockPoisoned => write!(f, "storage lock poisoned"),
            Self::Reentrant => write!(f, "cannot mutate the store from an observer callback"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidRecord(err) => Some(err),
            Self::StorageUnavailable(StorageFailure::Db(err)) => Some(err),
            Self::InvalidConfig(err) => Some(err),
            Self::InvalidIdentifier(_)
            | Self::NotAnItemLocator(_)
            | Self::StorageUnavailable(_) => None,
        }
    }
}

impl From<PetValidationError> for StoreError {
    fn from(value: PetValidationError) -> Self {
        Self::InvalidRecord(value)
    }
}

impl From<LocatorError> for StoreError {
    fn from(value: LocatorError) -> Self {
        match value {
            LocatorError::InvalidIdentifier(text) => Self::InvalidIdentifier(text),
            LocatorError::NotAnItemLocator => Self::NotAnItemLocator(Locator::Collection),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::StorageUnavailable(StorageFailure::Db(value))
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Db(err) => Self::StorageUnavailable(StorageFailure::Db(err)),
            RepoError::InvalidData(message) => {
                Self::StorageUnavailable(StorageFailure::InvalidData(message))
            }
        }
    }
}

impl From<ConfigError> for StoreError {
    fn from(value: ConfigError) -> Self {
        Self::InvalidConfig(value)
    }
}
