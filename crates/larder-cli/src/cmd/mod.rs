pub mod add;
pub mod classify;
pub mod clear;
pub mod completions;
pub mod config;
pub mod import;
pub mod list;
pub mod plan;
pub mod priority;
pub mod remove;
pub mod suggest;

use crate::output::{OutputMode, Renderable, pretty_kv};
use larder_core::config::EffectiveConfig;
use larder_core::db::InventoryStore;
use larder_core::model::record::InventoryRecord;
use std::io::{self, Write};

/// Per-invocation state shared by command handlers.
#[derive(Debug)]
pub struct Context {
    pub output: OutputMode,
    pub quiet: bool,
    pub config: EffectiveConfig,
}

impl Context {
    /// Open the inventory store at the resolved path.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`larder_core::error::StoreError`] if the store
    /// cannot be opened or migrated.
    pub fn open_store(&self) -> anyhow::Result<InventoryStore> {
        Ok(InventoryStore::open(&self.config.store_path)?)
    }

    /// False when `--quiet` asked us to skip human confirmations. JSON output
    /// is never suppressed.
    pub const fn reports(&self) -> bool {
        !self.quiet || self.output.is_json()
    }
}

/// One inventory record as a rendered row.
pub struct RecordRow<'a>(pub &'a InventoryRecord);

impl Renderable for RecordRow<'_> {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        let r = self.0;
        let flag = if r.is_priority { "!" } else { " " };
        writeln!(
            w,
            "{flag} {:<24} {:<12} {}",
            r.name,
            r.quantity,
            r.added_at.format("%Y-%m-%d %H:%M")
        )
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        let json = serde_json::to_string(self.0).map_err(io::Error::other)?;
        write!(w, "{json}")
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        let r = self.0;
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}",
            r.id,
            r.name,
            r.quantity,
            r.is_priority,
            r.added_at.to_rfc3339()
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["ID", "NAME", "QUANTITY", "PRIORITY", "ADDED_AT"]
    }
}

/// Full detail block for a single record.
pub fn pretty_record(w: &mut dyn Write, record: &InventoryRecord) -> io::Result<()> {
    pretty_kv(w, "Name", &record.name)?;
    pretty_kv(w, "Quantity", &record.quantity)?;
    pretty_kv(w, "Use soon", if record.is_priority { "yes" } else { "no" })?;
    pretty_kv(w, "Added", record.added_at.format("%Y-%m-%d %H:%M UTC").to_string())?;
    pretty_kv(w, "ID", &record.id)
}
