//! Schema and addressing contract for the pet catalog.
//!
//! # Responsibility
//! - Define the record shape, value domains and the locator forms.
//! - Provide pure validation used by the store before any write.
//!
//! # Invariants
//! - Nothing in this module touches storage.

pub mod locator;
pub mod pet;

/// Authority accepted in the `content://` form of a locator.
pub const CONTENT_AUTHORITY: &str = "com.example.android.pets";
/// Path segment naming the pet collection.
pub const PATH_PETS: &str = "pets";

