//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define per-entity data access contracts.
//! - Isolate SQL text, column whitelists and row mapping from orchestration.
//!
//! # Invariants
//! - Write paths validate payloads before any statement runs.
//! - SET/INSERT column lists come only from per-entity column enums.
//! - Update of a missing id is `NotFound`; delete of a missing id is a no-op.

use crate::db::migrations::{current_user_version, latest_version};
use rusqlite::Connection;

pub mod driver_repo;
mod error;
mod statement;
pub mod trip_repo;
pub mod vehicle_repo;

pub use error::{RepoError, RepoResult};

/// Rejects connections that skipped bootstrap or lack the entity table.
pub(crate) fn ensure_table_ready(conn: &Connection, table: &'static str) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(RepoError::MissingRequiredTable(table));
    }

    Ok(())
}
