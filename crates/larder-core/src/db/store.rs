//! The inventory store: one SQLite connection plus the write clock.
//!
//! Reads never fail outward. A read error is logged and yields an empty
//! result so callers can keep rendering; only writes return [`StoreError`].

use super::migrations::{self, MigrationOutcome};
use super::{configure_connection, decode_timestamp, encode_timestamp};
use crate::error::StoreError;
use crate::model::record::{
    InventoryRecord, display_name, fold_name, mint_id, normalize_quantity,
};
use chrono::{DateTime, Duration, Timelike, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params, types::Type};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

const SELECT_COLUMNS: &str = "SELECT id, name, quantity, isPriority, addedAt FROM inventory";

/// Handle to the persisted inventory.
#[derive(Debug)]
pub struct InventoryStore {
    conn: Connection,
    last_write: Option<DateTime<Utc>>,
}

impl InventoryStore {
    /// Open (creating if needed) the store at `path` and migrate it.
    ///
    /// Parent directories are created on demand.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or database cannot be created, or
    /// if the schema migration fails.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Directory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let open_error = |source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        };
        let conn = Connection::open(path).map_err(open_error)?;
        configure_connection(&conn).map_err(open_error)?;

        let store = Self::from_connection(conn)?;
        debug!(path = %path.display(), "opened inventory store");
        Ok(store)
    }

    /// Open a throwaway in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if SQLite cannot allocate the database or the schema
    /// cannot be created.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::Open {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        let mut store = Self {
            conn,
            last_write: None,
        };
        store.initialize()?;
        store.last_write = store.latest_added_at();
        Ok(store)
    }

    /// Ensure the table exists at the current shape.
    ///
    /// Idempotent. Runs automatically on open; exposed so a long-lived
    /// handle can re-check after an external tool touched the file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Migration`] if DDL or the legacy rebuild fails.
    pub fn initialize(&mut self) -> Result<MigrationOutcome, StoreError> {
        let outcome = migrations::migrate(&mut self.conn).map_err(StoreError::Migration)?;
        if let Some(count) = outcome.rebuilt_records {
            debug!(count, version = outcome.schema_version, "inventory table rebuilt");
        }
        Ok(outcome)
    }

    /// Every record, newest first.
    ///
    /// Records sharing a timestamp come back in reverse insertion order.
    #[must_use]
    pub fn get_all(&self) -> Vec<InventoryRecord> {
        match self.try_get_all() {
            Ok(records) => records,
            Err(error) => {
                error!(%error, "inventory read failed; returning no records");
                Vec::new()
            }
        }
    }

    fn try_get_all(&self) -> rusqlite::Result<Vec<InventoryRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_COLUMNS} ORDER BY addedAt DESC, rowid DESC"))?;
        let records = stmt.query_map([], record_from_row)?;
        records.collect()
    }

    /// Look up one record by case-insensitive name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<InventoryRecord> {
        match lookup(&self.conn, name) {
            Ok(found) => found,
            Err(error) => {
                error!(%error, name, "inventory lookup failed");
                None
            }
        }
    }

    /// Insert `name`, or refresh the record that already holds it.
    ///
    /// A refresh overwrites quantity, priority and `addedAt` but keeps the
    /// record id and the stored display name. A blank quantity stores `"1"`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyName`] for a blank name, or
    /// [`StoreError::Write`] if SQLite rejects the write.
    pub fn upsert(
        &mut self,
        name: &str,
        quantity: Option<&str>,
        is_priority: bool,
    ) -> Result<InventoryRecord, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        let quantity = normalize_quantity(quantity);
        let now = self.next_write_time();
        let fail = |source| StoreError::write("upsert", name, source);

        let tx = self.conn.transaction().map_err(fail)?;
        let record = match lookup(&tx, name).map_err(fail)? {
            Some(existing) => {
                tx.execute(
                    "UPDATE inventory SET quantity = ?1, isPriority = ?2, addedAt = ?3
                     WHERE id = ?4",
                    params![quantity, is_priority, encode_timestamp(now), existing.id],
                )
                .map_err(fail)?;
                debug!(id = %existing.id, name = %existing.name, "refreshed inventory record");
                InventoryRecord {
                    quantity,
                    is_priority,
                    added_at: now,
                    ..existing
                }
            }
            None => {
                let record = InventoryRecord {
                    id: mint_id(name, now),
                    name: display_name(name),
                    quantity,
                    is_priority,
                    added_at: now,
                };
                tx.execute(
                    "INSERT INTO inventory (id, name, nameKey, quantity, isPriority, addedAt)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        record.id,
                        record.name,
                        fold_name(name),
                        record.quantity,
                        record.is_priority,
                        encode_timestamp(record.added_at),
                    ],
                )
                .map_err(fail)?;
                debug!(id = %record.id, name = %record.name, "inserted inventory record");
                record
            }
        };
        tx.commit().map_err(fail)?;
        Ok(record)
    }

    /// Delete the record named `name` (any case). Returns rows removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] if the delete fails.
    pub fn remove(&mut self, name: &str) -> Result<usize, StoreError> {
        let removed = self
            .conn
            .execute("DELETE FROM inventory WHERE nameKey = ?1", [fold_name(name)])
            .map_err(|source| StoreError::write("remove", name, source))?;
        debug!(name, removed, "removed inventory record");
        Ok(removed)
    }

    /// Flip the priority flag of `name`. `addedAt` is left alone.
    ///
    /// Returns the updated record, or `None` when no record matches.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] if the update fails.
    pub fn toggle_priority(&mut self, name: &str) -> Result<Option<InventoryRecord>, StoreError> {
        let fail = |source| StoreError::write("toggle priority", name, source);
        let tx = self.conn.transaction().map_err(fail)?;
        let Some(mut record) = lookup(&tx, name).map_err(fail)? else {
            return Ok(None);
        };
        record.is_priority = !record.is_priority;
        tx.execute(
            "UPDATE inventory SET isPriority = ?1 WHERE id = ?2",
            params![record.is_priority, record.id],
        )
        .map_err(fail)?;
        tx.commit().map_err(fail)?;
        debug!(id = %record.id, priority = record.is_priority, "toggled priority");
        Ok(Some(record))
    }

    /// Delete every record. Returns rows removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] if the delete fails.
    pub fn clear(&mut self) -> Result<usize, StoreError> {
        let removed = self
            .conn
            .execute("DELETE FROM inventory", [])
            .map_err(|source| StoreError::write("clear", "*", source))?;
        info!(removed, "inventory cleared");
        Ok(removed)
    }

    /// Close the connection, surfacing any error SQLite reports on teardown.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Close`] if SQLite cannot finalize the handle.
    pub fn close(self) -> Result<(), StoreError> {
        self.conn
            .close()
            .map_err(|(_conn, source)| StoreError::Close(source))
    }

    #[cfg(test)]
    pub(crate) const fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Strictly increasing write time, at the precision we persist.
    fn next_write_time(&mut self) -> DateTime<Utc> {
        let now = truncate_to_micros(Utc::now());
        let at = match self.last_write {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_write = Some(at);
        at
    }

    fn latest_added_at(&self) -> Option<DateTime<Utc>> {
        self.conn
            .query_row("SELECT MAX(addedAt) FROM inventory", [], |row| {
                row.get::<_, Option<String>>(0)
            })
            .ok()
            .flatten()
            .and_then(|raw| decode_timestamp(&raw))
    }
}

fn lookup(conn: &Connection, name: &str) -> rusqlite::Result<Option<InventoryRecord>> {
    conn.query_row(
        &format!("{SELECT_COLUMNS} WHERE nameKey = ?1"),
        [fold_name(name)],
        record_from_row,
    )
    .optional()
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<InventoryRecord> {
    let raw_added_at: String = row.get(4)?;
    let added_at = decode_timestamp(&raw_added_at).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            Type::Text,
            format!("invalid addedAt '{raw_added_at}'").into(),
        )
    })?;
    Ok(InventoryRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        quantity: row.get(2)?,
        is_priority: row.get(3)?,
        added_at,
    })
}

fn truncate_to_micros(at: DateTime<Utc>) -> DateTime<Utc> {
    at.with_nanosecond(at.nanosecond() / 1_000 * 1_000)
        .unwrap_or(at)
}

#[cfg(test)]
mod tests {
    use super::InventoryStore;
    use crate::error::StoreError;

    fn store() -> InventoryStore {
        InventoryStore::open_in_memory().expect("open in-memory store")
    }

    fn names(store: &InventoryStore) -> Vec<String> {
        store.get_all().into_iter().map(|r| r.name).collect()
    }

    #[test]
    fn fresh_store_is_empty() {
        assert!(store().get_all().is_empty());
    }

    #[test]
    fn insert_capitalizes_and_defaults_quantity() {
        let mut store = store();
        let record = store.upsert("spinach", None, false).expect("insert");
        assert_eq!(record.name, "Spinach");
        assert_eq!(record.quantity, "1");
        assert!(!record.is_priority);
        assert!(record.id.starts_with("inv-"));
        assert_eq!(store.get_all(), vec![record]);
    }

    #[test]
    fn upsert_is_case_insensitive_and_keeps_id_and_display_name() {
        let mut store = store();
        let first = store.upsert("Milk", Some("1L"), false).expect("insert");
        let second = store.upsert("MILK", Some("2L"), true).expect("refresh");

        assert_eq!(second.id, first.id);
        assert_eq!(second.name, "Milk");
        assert_eq!(second.quantity, "2L");
        assert!(second.is_priority);
        assert!(second.added_at > first.added_at);

        let all = store.get_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], second);
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut store = store();
        let err = store.upsert("   ", Some("2"), false).expect_err("blank name");
        assert!(matches!(err, StoreError::EmptyName));
        assert!(store.get_all().is_empty());
    }

    #[test]
    fn get_all_is_newest_first() {
        let mut store = store();
        for name in ["eggs", "tofu", "salmon"] {
            store.upsert(name, None, false).expect("insert");
        }
        assert_eq!(names(&store), ["Salmon", "Tofu", "Eggs"]);

        store.upsert("eggs", Some("12"), false).expect("refresh");
        assert_eq!(names(&store), ["Eggs", "Salmon", "Tofu"]);
    }

    #[test]
    fn remove_matches_any_case_and_reports_count() {
        let mut store = store();
        store.upsert("Heavy cream", None, false).expect("insert");
        assert_eq!(store.remove("HEAVY CREAM").expect("remove"), 1);
        assert_eq!(store.remove("heavy cream").expect("remove again"), 0);
        assert!(store.get_all().is_empty());
    }

    #[test]
    fn non_ascii_names_fold_like_ascii_ones() {
        let mut store = store();
        let first = store.upsert("éclair", None, false).expect("insert");
        let again = store.upsert("éclair", Some("4"), false).expect("refresh");
        let shouted = store.upsert("ÉCLAIR", Some("6"), false).expect("refresh upper");
        assert_eq!(first.name, "Éclair");
        assert_eq!(again.id, first.id);
        assert_eq!(shouted.id, first.id);
        assert_eq!(store.get_all().len(), 1);

        let toggled = store
            .toggle_priority("Éclair")
            .expect("toggle")
            .expect("record exists");
        assert!(toggled.is_priority);

        assert_eq!(store.remove("ÉCLAIR").expect("remove"), 1);
        assert!(store.get_all().is_empty());
    }

    #[test]
    fn toggle_priority_flips_flag_without_touching_added_at() {
        let mut store = store();
        let original = store.upsert("broccoli", None, false).expect("insert");

        let toggled = store
            .toggle_priority("BROCCOLI")
            .expect("toggle")
            .expect("record exists");
        assert!(toggled.is_priority);
        assert_eq!(toggled.added_at, original.added_at);
        assert_eq!(store.find("broccoli"), Some(toggled));

        let back = store
            .toggle_priority("broccoli")
            .expect("toggle back")
            .expect("record exists");
        assert!(!back.is_priority);
    }

    #[test]
    fn toggle_priority_on_missing_name_is_none() {
        let mut store = store();
        assert_eq!(store.toggle_priority("ghost").expect("toggle"), None);
    }

    #[test]
    fn clear_removes_everything() {
        let mut store = store();
        store.upsert("a1", None, false).expect("insert");
        store.upsert("b2", None, true).expect("insert");
        assert_eq!(store.clear().expect("clear"), 2);
        assert!(store.get_all().is_empty());
    }

    #[test]
    fn read_errors_degrade_to_empty() {
        let store = store();
        store
            .connection()
            .execute_batch("DROP TABLE inventory;")
            .expect("drop table");
        assert!(store.get_all().is_empty());
        assert_eq!(store.find("milk"), None);
    }

    #[test]
    fn write_errors_surface() {
        let mut store = store();
        store
            .connection()
            .execute_batch("DROP TABLE inventory;")
            .expect("drop table");
        let err = store.upsert("milk", None, false).expect_err("write fails");
        assert!(matches!(err, StoreError::Write { op: "upsert", .. }));
    }

    #[test]
    fn reopened_store_keeps_records_and_clock() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("inventory.sqlite3");

        let first = {
            let mut store = InventoryStore::open(&path).expect("open");
            let record = store.upsert("salmon", Some("2 fillets"), true).expect("insert");
            store.close().expect("close");
            record
        };

        let mut store = InventoryStore::open(&path).expect("reopen");
        assert_eq!(store.get_all(), vec![first.clone()]);
        let later = store.upsert("tofu", None, false).expect("insert");
        assert!(later.added_at > first.added_at);
    }
}
