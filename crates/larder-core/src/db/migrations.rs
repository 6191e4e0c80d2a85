//! Schema migrations for the inventory database.
//!
//! Two paths exist:
//! - versioned migrations keyed on `PRAGMA user_version`, applied in order
//! - a rebuild for tables whose column set differs from the current shape
//!   (or that predate versioning): read every row, drop the table, recreate
//!   it, and reinsert the rows with defaults filled in

use super::{encode_timestamp, schema};
use crate::model::record::{DEFAULT_QUANTITY, fold_name, mint_id};
use chrono::{DateTime, Utc};
use rusqlite::{
    Connection, params,
    types::{Type, Value, ValueRef},
};
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

/// Latest schema version understood by this binary.
pub const LATEST_SCHEMA_VERSION: u32 = 2;

/// Fresh databases jump straight to the newest DDL. Tables written by
/// older versions take the rebuild path, which recomputes `nameKey`.
const MIGRATIONS: &[(u32, &str)] = &[(2, schema::MIGRATION_V2_SQL)];

/// Name used for legacy rows that carry no name at all.
const UNKNOWN_NAME: &str = "Unknown";

/// What [`migrate`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationOutcome {
    /// Schema version after migrating.
    pub schema_version: u32,
    /// Rows carried over by a table rebuild, or `None` when no rebuild ran.
    pub rebuilt_records: Option<usize>,
}

/// Read `PRAGMA user_version` and convert it to a Rust `u32`.
///
/// # Errors
///
/// Returns an error if querying SQLite fails or the version value cannot be
/// represented as `u32`.
pub fn current_schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    let version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    u32::try_from(version).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(0, Type::Integer, Box::new(error))
    })
}

/// Column names of `table`, empty when the table does not exist.
///
/// # Errors
///
/// Returns an error if the pragma query fails.
pub fn table_columns(conn: &Connection, table: &str) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
    let columns = stmt.query_map([table], |row| row.get::<_, String>(0))?;
    columns.collect()
}

/// Bring the database to [`LATEST_SCHEMA_VERSION`].
///
/// Safe to call on every start: versioned steps only run when
/// `version > user_version`, their DDL uses `IF NOT EXISTS`, and a rebuilt
/// table already has the current shape on the next call.
///
/// # Errors
///
/// Returns an error if any DDL or reinsert fails. An unreadable legacy table
/// is not an error: its rows are treated as absent.
pub fn migrate(conn: &mut Connection) -> rusqlite::Result<MigrationOutcome> {
    let mut current = current_schema_version(conn)?;
    let columns = table_columns(conn, schema::INVENTORY_TABLE)?;

    if !columns.is_empty() && (current == 0 || !schema::has_current_shape(&columns)) {
        let carried = rebuild_inventory(conn)?;
        return Ok(MigrationOutcome {
            schema_version: LATEST_SCHEMA_VERSION,
            rebuilt_records: Some(carried),
        });
    }

    for (version, sql) in MIGRATIONS {
        if *version <= current {
            continue;
        }

        let tx = conn.transaction()?;
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", i64::from(*version))?;
        tx.commit()?;
        current = *version;
    }

    Ok(MigrationOutcome {
        schema_version: current,
        rebuilt_records: None,
    })
}

/// A legacy row with every field resolved to a current-schema value.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CarriedRow {
    id: String,
    name: String,
    quantity: String,
    is_priority: bool,
    added_at: DateTime<Utc>,
}

fn rebuild_inventory(conn: &mut Connection) -> rusqlite::Result<usize> {
    let rows = match read_legacy_rows(conn) {
        Ok(rows) => rows,
        Err(error) => {
            warn!(%error, "legacy inventory table unreadable; recreating it empty");
            Vec::new()
        }
    };
    let rows = dedupe(rows);

    let tx = conn.transaction()?;
    tx.execute_batch("DROP TABLE IF EXISTS inventory;")?;
    tx.execute_batch(schema::MIGRATION_V2_SQL)?;
    {
        let mut insert = tx.prepare(
            "INSERT INTO inventory (id, name, nameKey, quantity, isPriority, addedAt)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for row in &rows {
            insert.execute(params![
                row.id,
                row.name,
                fold_name(&row.name),
                row.quantity,
                row.is_priority,
                encode_timestamp(row.added_at),
            ])?;
        }
    }
    tx.pragma_update(None, "user_version", i64::from(LATEST_SCHEMA_VERSION))?;
    tx.commit()?;

    info!(migrated = rows.len(), "migrated inventory records to the current schema");
    Ok(rows.len())
}

fn read_legacy_rows(conn: &Connection) -> rusqlite::Result<Vec<CarriedRow>> {
    let mut stmt = conn.prepare("SELECT * FROM inventory")?;
    let names: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_ascii_lowercase)
        .collect();

    let now = Utc::now();
    let mut rows = stmt.query([])?;
    let mut carried = Vec::new();
    while let Some(row) = rows.next()? {
        let mut fields: HashMap<String, Value> = HashMap::with_capacity(names.len());
        for (idx, name) in names.iter().enumerate() {
            fields.insert(name.clone(), owned_value(row.get_ref(idx)?));
        }
        carried.push(carry_row(&fields, now));
    }
    Ok(carried)
}

/// Copy a cell out of SQLite. Text that is not valid UTF-8 is decoded
/// lossily so one bad row cannot abort the rebuild.
fn owned_value(cell: ValueRef<'_>) -> Value {
    match cell {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(int) => Value::Integer(int),
        ValueRef::Real(real) => Value::Real(real),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    }
}

fn carry_row(fields: &HashMap<String, Value>, now: DateTime<Utc>) -> CarriedRow {
    let name = field(fields, &["name"])
        .and_then(value_text)
        .map_or_else(|| UNKNOWN_NAME.to_string(), |n| n.trim().to_string());
    let added_at = field(fields, &["addedat", "added_at"])
        .and_then(value_text)
        .and_then(|raw| super::decode_timestamp(&raw))
        .unwrap_or(now);
    let id = field(fields, &["id"])
        .and_then(value_text)
        .unwrap_or_else(|| mint_id(&name, added_at));

    CarriedRow {
        quantity: field(fields, &["quantity", "qty"])
            .and_then(value_text)
            .unwrap_or_else(|| DEFAULT_QUANTITY.to_string()),
        is_priority: field(fields, &["ispriority", "is_priority", "priority"])
            .is_some_and(value_flag),
        id,
        name,
        added_at,
    }
}

fn field<'a>(fields: &'a HashMap<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .find_map(|alias| fields.get(*alias))
        .filter(|value| !matches!(value, Value::Null))
}

fn value_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Text(text) => text.clone(),
        Value::Integer(int) => int.to_string(),
        Value::Real(real) => real.to_string(),
        Value::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        Value::Null => return None,
    };
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

fn value_flag(value: &Value) -> bool {
    match value {
        Value::Integer(int) => *int != 0,
        Value::Real(real) => real.abs() > f64::EPSILON,
        Value::Text(text) => matches!(
            text.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Value::Blob(_) | Value::Null => false,
    }
}

/// Collapse rows that collide under case folding (newest write wins) and
/// re-mint ids that collide.
fn dedupe(rows: Vec<CarriedRow>) -> Vec<CarriedRow> {
    let total = rows.len();
    let mut kept: Vec<CarriedRow> = Vec::with_capacity(total);
    let mut by_name: HashMap<String, usize> = HashMap::new();

    for row in rows {
        match by_name.get(&fold_name(&row.name)) {
            Some(&at) => {
                if row.added_at > kept[at].added_at {
                    kept[at] = row;
                }
            }
            None => {
                by_name.insert(fold_name(&row.name), kept.len());
                kept.push(row);
            }
        }
    }

    let mut ids = HashSet::with_capacity(kept.len());
    for row in &mut kept {
        while !ids.insert(row.id.clone()) {
            row.id = mint_id(&row.name, row.added_at);
        }
    }

    if kept.len() < total {
        warn!(
            dropped = total - kept.len(),
            "legacy inventory held names differing only by case; kept the newest of each"
        );
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::{LATEST_SCHEMA_VERSION, current_schema_version, migrate, table_columns};
    use crate::db::schema;
    use rusqlite::{Connection, params};

    fn sqlite_object_exists(
        conn: &Connection,
        object_type: &str,
        object_name: &str,
    ) -> rusqlite::Result<bool> {
        conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            )",
            params![object_type, object_name],
            |row| row.get(0),
        )
    }

    fn legacy_four_column_table(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute_batch(
            "CREATE TABLE inventory (id TEXT, name TEXT, isPriority BOOLEAN, addedAt TEXT);",
        )
    }

    #[test]
    fn migrate_empty_db_to_latest() -> rusqlite::Result<()> {
        let mut conn = Connection::open_in_memory()?;

        let outcome = migrate(&mut conn)?;
        assert_eq!(outcome.schema_version, LATEST_SCHEMA_VERSION);
        assert_eq!(outcome.rebuilt_records, None);
        assert_eq!(current_schema_version(&conn)?, LATEST_SCHEMA_VERSION);

        assert!(sqlite_object_exists(&conn, "table", "inventory")?);
        for index in schema::REQUIRED_INDEXES {
            assert!(
                sqlite_object_exists(&conn, "index", index)?,
                "missing expected index {index}"
            );
        }

        Ok(())
    }

    #[test]
    fn migrate_is_idempotent() -> rusqlite::Result<()> {
        let mut conn = Connection::open_in_memory()?;

        assert_eq!(migrate(&mut conn)?.schema_version, LATEST_SCHEMA_VERSION);
        let second = migrate(&mut conn)?;
        assert_eq!(second.schema_version, LATEST_SCHEMA_VERSION);
        assert_eq!(second.rebuilt_records, None);

        Ok(())
    }

    #[test]
    fn rebuild_fills_missing_quantity_and_keeps_count() -> rusqlite::Result<()> {
        let mut conn = Connection::open_in_memory()?;
        legacy_four_column_table(&conn)?;
        conn.execute_batch(
            "INSERT INTO inventory VALUES ('a1', 'Milk', 1, '2024-03-01T10:00:00Z');
             INSERT INTO inventory VALUES ('a2', 'Spinach', 0, '2024-03-02T10:00:00Z');
             INSERT INTO inventory VALUES ('a3', 'Eggs', 0, '2024-03-03T10:00:00Z');",
        )?;

        let outcome = migrate(&mut conn)?;
        assert_eq!(outcome.rebuilt_records, Some(3));

        let columns = table_columns(&conn, schema::INVENTORY_TABLE)?;
        assert!(schema::has_current_shape(&columns));

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM inventory", [], |row| row.get(0))?;
        assert_eq!(count, 3);

        let non_default: i64 = conn.query_row(
            "SELECT COUNT(*) FROM inventory WHERE quantity <> '1'",
            [],
            |row| row.get(0),
        )?;
        assert_eq!(non_default, 0);

        let (id, priority): (String, bool) = conn.query_row(
            "SELECT id, isPriority FROM inventory WHERE name = 'Milk'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        assert_eq!(id, "a1");
        assert!(priority);

        Ok(())
    }

    #[test]
    fn rebuild_regenerates_missing_ids_and_names() -> rusqlite::Result<()> {
        let mut conn = Connection::open_in_memory()?;
        legacy_four_column_table(&conn)?;
        conn.execute_batch(
            "INSERT INTO inventory VALUES (NULL, 'Tofu', 'true', NULL);
             INSERT INTO inventory VALUES ('b2', NULL, 0, '2024-03-02T10:00:00Z');",
        )?;

        migrate(&mut conn)?;

        let tofu: (String, bool, String) = conn.query_row(
            "SELECT id, isPriority, addedAt FROM inventory WHERE name = 'Tofu'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;
        assert!(tofu.0.starts_with("inv-"));
        assert!(tofu.1);
        assert!(!tofu.2.is_empty());

        let unknown: i64 = conn.query_row(
            "SELECT COUNT(*) FROM inventory WHERE name = 'Unknown'",
            [],
            |row| row.get(0),
        )?;
        assert_eq!(unknown, 1);

        Ok(())
    }

    #[test]
    fn rebuild_keeps_newest_of_case_colliding_names() -> rusqlite::Result<()> {
        let mut conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE TABLE inventory (id TEXT, name TEXT, quantity TEXT);
             INSERT INTO inventory VALUES ('c1', 'milk', '1L');",
        )?;
        conn.execute_batch("ALTER TABLE inventory ADD COLUMN addedAt TEXT;")?;
        conn.execute(
            "INSERT INTO inventory VALUES ('c2', 'MILK', '2L', '2099-01-01T00:00:00Z')",
            [],
        )?;

        let outcome = migrate(&mut conn)?;
        assert_eq!(outcome.rebuilt_records, Some(1));

        let quantity: String =
            conn.query_row("SELECT quantity FROM inventory", [], |row| row.get(0))?;
        assert_eq!(quantity, "2L");

        Ok(())
    }

    #[test]
    fn unversioned_table_with_current_shape_is_adopted() -> rusqlite::Result<()> {
        let mut conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE TABLE inventory (
                 id TEXT, name TEXT, nameKey TEXT, quantity TEXT, isPriority BOOLEAN, addedAt TEXT
             );
             INSERT INTO inventory
                 VALUES ('d1', 'Salmon', 'salmon', '2 fillets', 1, '2024-05-01T08:00:00Z');",
        )?;

        let outcome = migrate(&mut conn)?;
        assert_eq!(outcome.rebuilt_records, Some(1));
        assert_eq!(current_schema_version(&conn)?, LATEST_SCHEMA_VERSION);

        let again = migrate(&mut conn)?;
        assert_eq!(again.rebuilt_records, None);

        Ok(())
    }

    #[test]
    fn invalid_utf8_text_is_carried_lossily() -> rusqlite::Result<()> {
        let mut conn = Connection::open_in_memory()?;
        legacy_four_column_table(&conn)?;
        conn.execute_batch(
            "INSERT INTO inventory
                 VALUES ('e1', CAST(x'4d696c6bff' AS TEXT), 1, '2024-03-01T10:00:00Z');
             INSERT INTO inventory VALUES ('e2', 'Eggs', 0, '2024-03-02T10:00:00Z');",
        )?;

        let outcome = migrate(&mut conn)?;
        assert_eq!(outcome.rebuilt_records, Some(2));

        let name: String =
            conn.query_row("SELECT name FROM inventory WHERE id = 'e1'", [], |row| {
                row.get(0)
            })?;
        assert!(name.starts_with("Milk"));
        assert!(name.contains('\u{FFFD}'));

        Ok(())
    }

    #[test]
    fn v1_table_gains_unicode_name_keys() -> rusqlite::Result<()> {
        let mut conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE TABLE inventory (
                 id TEXT PRIMARY KEY, name TEXT, quantity TEXT, isPriority INTEGER, addedAt TEXT
             );
             INSERT INTO inventory VALUES ('f1', 'Éclair', '2', 0, '2024-03-01T10:00:00Z');
             INSERT INTO inventory VALUES ('f2', 'éclair', '5', 1, '2024-03-04T10:00:00Z');
             PRAGMA user_version = 1;",
        )?;

        let outcome = migrate(&mut conn)?;
        assert_eq!(outcome.rebuilt_records, Some(1));
        assert_eq!(current_schema_version(&conn)?, LATEST_SCHEMA_VERSION);

        let (key, quantity): (String, String) = conn.query_row(
            "SELECT nameKey, quantity FROM inventory",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        assert_eq!(key, "éclair");
        assert_eq!(quantity, "5");

        Ok(())
    }
}
