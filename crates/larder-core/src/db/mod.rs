//! SQLite persistence for the household inventory.
//!
//! Runtime defaults:
//! - `journal_mode = WAL` so a reader never blocks on the single writer
//! - `busy_timeout = 5s` to ride out transient lock failures
//! - `synchronous = NORMAL`, durable enough for a WAL-mode local store

pub mod migrations;
pub mod schema;
pub mod store;

pub use store::InventoryStore;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;
use std::time::Duration;

/// Busy timeout used for inventory DB connections.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// File name used when only a directory is configured.
pub const DEFAULT_DB_FILE: &str = "inventory.sqlite3";

fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    let _journal_mode: String =
        conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
    Ok(())
}

/// Fixed-width RFC 3339 encoding, so text order matches time order.
pub(crate) fn encode_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|at| at.with_timezone(&Utc))
}
