//! Logical record addresses.
//!
//! # Responsibility
//! - Model the two addressing forms exposed to callers: the whole collection
//!   and one record by id.
//! - Parse and render the textual `pets` / `pets/{id}` syntax.
//!
//! # Invariants
//! - `item_locator` and parsing never yield a negative id. The store
//!   rejects `Locator::Item` values built around one.
//! - Building an item locator does not check that the record exists.

use crate::contract::pet::PetId;
use crate::contract::{CONTENT_AUTHORITY, PATH_PETS};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Address of either all records or a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Locator {
    Collection,
    Item(PetId),
}

/// Locator construction and interpretation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatorError {
    /// Malformed text or negative id.
    InvalidIdentifier(String),
    /// An item-only operation received the collection locator.
    NotAnItemLocator,
}

impl Display for LocatorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIdentifier(value) => write!(f, "invalid locator identifier: `{value}`"),
            Self::NotAnItemLocator => write!(f, "expected an item locator, got the collection"),
        }
    }
}

impl Error for LocatorError {}

/// Returns the locator denoting all records.
pub fn collection_locator() -> Locator {
    Locator::Collection
}

/// Returns the locator for one record id.
pub fn item_locator(id: PetId) -> Result<Locator, LocatorError> {
    if id < 0 {
        return Err(LocatorError::InvalidIdentifier(id.to_string()));
    }
    Ok(Locator::Item(id))
}

/// Extracts the record id from an item locator.
pub fn parse_item_id(locator: &Locator) -> Result<PetId, LocatorError> {
    match locator {
        Locator::Item(id) => Ok(*id),
        Locator::Collection => Err(LocatorError::NotAnItemLocator),
    }
}

impl Locator {
    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Collection)
    }

    pub fn item_id(&self) -> Option<PetId> {
        match self {
            Self::Item(id) => Some(*id),
            Self::Collection => None,
        }
    }
}

impl Display for Locator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Collection => f.write_str(PATH_PETS),
            Self::Item(id) => write!(f, "{PATH_PETS}/{id}"),
        }
    }
}

impl FromStr for Locator {
    type Err = LocatorError;

    /// Accepts `pets`, `pets/{id}`, and both forms behind the
    /// `content://<authority>/` prefix.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || LocatorError::InvalidIdentifier(value.to_string());
        let trimmed = value.trim();
        let path = match trimmed.strip_prefix("content://") {
            Some(rest) => rest
                .strip_prefix(CONTENT_AUTHORITY)
                .and_then(|rest| rest.strip_prefix('/'))
                .ok_or_else(invalid)?,
            None => trimmed,
        };

        let mut segments = path.split('/');
        if segments.next() != Some(PATH_PETS) {
            return Err(invalid());
        }

        match (segments.next(), segments.next()) {
            (None, _) => Ok(Self::Collection),
            (Some(id), None) => {
                if id.is_empty() || !id.bytes().all(|byte| byte.is_ascii_digit()) {
                    return Err(invalid());
                }
                let id = id.parse::<PetId>().map_err(|_| invalid())?;
                item_locator(id)
            }
            (Some(_), Some(_)) => Err(invalid()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_locator_rejects_negative_ids() {
        assert_eq!(item_locator(0), Ok(Locator::Item(0)));
        assert_eq!(
            item_locator(-3),
            Err(LocatorError::InvalidIdentifier("-3".to_string()))
        );
    }

    #[test]
    fn parse_item_id_rejects_collection() {
        assert_eq!(parse_item_id(&Locator::Item(9)), Ok(9));
        assert_eq!(
            parse_item_id(&collection_locator()),
            Err(LocatorError::NotAnItemLocator)
        );
    }

    #[test]
    fn display_uses_short_form() {
        assert_eq!(Locator::Collection.to_string(), "pets");
        assert_eq!(Locator::Item(12).to_string(), "pets/12");
    }

    #[test]
    fn parses_short_and_content_forms() {
        assert_eq!("pets".parse::<Locator>(), Ok(Locator::Collection));
        assert_eq!("pets/5".parse::<Locator>(), Ok(Locator::Item(5)));
        assert_eq!(
            "content://com.example.android.pets/pets".parse::<Locator>(),
            Ok(Locator::Collection)
        );
        assert_eq!(
            "content://com.example.android.pets/pets/44".parse::<Locator>(),
            Ok(Locator::Item(44))
        );
    }

    #[test]
    fn rejects_malformed_text() {
        for value in [
            "",
            "dogs",
            "pets/",
            "pets/-1",
            "pets/abc",
            "pets/1/2",
            "content://other/pets/1",
            "pets/99999999999999999999",
        ] {
            assert!(
                matches!(
                    value.parse::<Locator>(),
                    Err(LocatorError::InvalidIdentifier(_))
                ),
                "`{value}` should be rejected"
            );
        }
    }
}
