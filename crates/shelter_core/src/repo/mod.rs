//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define row-level data access contracts.
//! - Isolate SQLite query details from the store engine.
//!
//! # Invariants
//! - Repository APIs report missing rows through `Option` and affected
//!   counts, not errors.

pub mod pet_repo;
