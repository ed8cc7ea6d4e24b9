//! Record store engine.
//!
//! # Responsibility
//! - Serve locator-addressed CRUD over the prepared schema.
//! - Deliver payload-free change notifications and live views.
//!
//! # Invariants
//! - No operation bypasses contract validation before a write.
//! - Missing records surface as empty results or affected count 0.

pub mod engine;
pub mod error;
pub mod live;
pub mod observer;
