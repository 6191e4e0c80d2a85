//! Canonical SQLite schema for the larder inventory.
//!
//! One table, `inventory`, keyed by record id. Column names follow the
//! persisted layout (`isPriority`, `addedAt`) so older stores line up
//! column-for-column with the current shape.
//!
//! Names are unique under Unicode case folding. SQLite's `lower()` only
//! folds ASCII, so the folded key is computed in Rust
//! ([`fold_name`](crate::model::record::fold_name)) and stored in `nameKey`.

/// Name of the inventory table.
pub const INVENTORY_TABLE: &str = "inventory";

/// Columns of the current table shape, in declaration order.
pub const INVENTORY_COLUMNS: [&str; 6] =
    ["id", "name", "nameKey", "quantity", "isPriority", "addedAt"];

/// Migration v2: inventory table keyed by the folded name.
///
/// v1 tables lack `nameKey`, so they fail [`has_current_shape`] and are
/// rebuilt rather than altered in place.
pub const MIGRATION_V2_SQL: &str = r"
CREATE TABLE IF NOT EXISTS inventory (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    nameKey TEXT NOT NULL,
    quantity TEXT NOT NULL DEFAULT '1',
    isPriority INTEGER NOT NULL DEFAULT 0 CHECK (isPriority IN (0, 1)),
    addedAt TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_inventory_name_key
    ON inventory(nameKey);

CREATE INDEX IF NOT EXISTS idx_inventory_added_at
    ON inventory(addedAt DESC);
";

/// Indexes every migrated database must carry.
pub const REQUIRED_INDEXES: &[&str] = &["idx_inventory_name_key", "idx_inventory_added_at"];

/// True when `columns` is exactly the current column set (order-insensitive).
#[must_use]
pub fn has_current_shape(columns: &[String]) -> bool {
    columns.len() == INVENTORY_COLUMNS.len()
        && INVENTORY_COLUMNS
            .iter()
            .all(|expected| columns.iter().any(|c| c.eq_ignore_ascii_case(expected)))
}
