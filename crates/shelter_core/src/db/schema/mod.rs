//! `pets` table creation and destructive upgrade.
//!
//! # Responsibility
//! - Decide which lifecycle step a stamped version requires.
//! - Create or drop-and-recreate the table atomically.
//!
//! # Invariants
//! - Every step runs in one transaction together with its `user_version` stamp.
//! - Upgrades do not migrate rows; existing data is dropped.
//! - Downgrades are refused.

use crate::db::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;

/// Schema version this binary writes.
pub const SCHEMA_VERSION: u32 = 1;

const CREATE_PETS_SQL: &str = include_str!("create_pets.sql");
const DROP_PETS_SQL: &str = include_str!("drop_pets.sql");

/// Lifecycle step needed to reach the target version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaPlan {
    Create,
    Upgrade { from: u32 },
    UpToDate,
}

/// Chooses the lifecycle step for a stamped version.
pub fn plan(stamped: u32, target: u32) -> DbResult<SchemaPlan> {
    if stamped > target {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: stamped,
            latest_supported: target,
        });
    }
    Ok(match stamped {
        0 => SchemaPlan::Create,
        version if version < target => SchemaPlan::Upgrade { from: version },
        _ => SchemaPlan::UpToDate,
    })
}

/// Reads the version stamped into the storage file.
pub fn stamped_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Creates the `pets` table and stamps `version`.
pub fn create(conn: &mut Connection, version: u32) -> DbResult<()> {
    info!("event=schema_create module=db status=start version={version}");
    let tx = conn.transaction()?;
    let result = tx
        .execute_batch(CREATE_PETS_SQL)
        .and_then(|()| tx.execute_batch(&format!("PRAGMA user_version = {version};")));
    if let Err(err) = result {
        error!("event=schema_create module=db status=error version={version} error={err}");
        return Err(err.into());
    }
    tx.commit()?;
    info!("event=schema_create module=db status=ok version={version}");
    Ok(())
}

/// Drops the `pets` table, recreates it, and stamps `to`.
pub fn upgrade(conn: &mut Connection, from: u32, to: u32) -> DbResult<()> {
    info!("event=schema_upgrade module=db status=start from={from} to={to}");
    let tx = conn.transaction()?;
    let result = tx
        .execute_batch(DROP_PETS_SQL)
        .and_then(|()| tx.execute_batch(CREATE_PETS_SQL))
        .and_then(|()| tx.execute_batch(&format!("PRAGMA user_version = {to};")));
    if let Err(err) = result {
        error!(
            "event=schema_upgrade module=db status=error from={from} to={to} error={err}"
        );
        return Err(err.into());
    }
    tx.commit()?;
    info!("event=schema_upgrade module=db status=ok from={from} to={to}");
    Ok(())
}
