//! `larder add`: stock one or more ingredients.
//!
//! Each argument may itself be a comma-separated list. Adding a name that is
//! already stocked (in any letter case) refreshes that record instead of
//! creating a second one.

use super::{Context, RecordRow};
use crate::output::{CliError, OutputMode, pretty_section, render_list, write_list};
use anyhow::{Context as _, Result};
use clap::Args;
use larder_core::error::ErrorCode;
use larder_core::ingest::parse_list;
use std::io::{self, Write};
use tracing::info;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Ingredient names (comma-separated lists are split).
    #[arg(required = true, value_name = "NAME")]
    pub names: Vec<String>,

    /// Quantity label stored with every named item (default "1").
    #[arg(long, short = 'n', value_name = "QTY")]
    pub qty: Option<String>,

    /// Flag the items as "use soon" so planning starts with them.
    #[arg(long, short)]
    pub priority: bool,
}

/// Expand the raw arguments into individual names.
fn collect_names(raw: &[String]) -> Vec<String> {
    raw.iter().flat_map(|arg| parse_list(arg)).collect()
}

pub fn run_add(args: &AddArgs, ctx: &Context) -> Result<()> {
    let names = collect_names(&args.names);
    if names.is_empty() {
        return Err(CliError::coded(ErrorCode::EmptyItemName, "no ingredient names given").into());
    }

    let mut store = ctx.open_store()?;
    let mut stocked = Vec::with_capacity(names.len());
    for name in &names {
        let record = store
            .upsert(name, args.qty.as_deref(), args.priority)
            .with_context(|| format!("adding '{name}'"))?;
        stocked.push(record);
    }
    store.close()?;
    info!(count = stocked.len(), priority = args.priority, "stocked items");

    if !ctx.reports() {
        return Ok(());
    }
    let rows: Vec<RecordRow<'_>> = stocked.iter().map(RecordRow).collect();
    if ctx.output == OutputMode::Pretty {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        pretty_section(&mut out, &format!("Stocked {} item(s)", rows.len()))?;
        write_list(&mut out, &rows, OutputMode::Pretty)?;
        out.flush()?;
        return Ok(());
    }
    render_list(&rows, ctx.output)?;
    Ok(())
}
