//! `larder priority`: flip an item's "use soon" flag.

use super::{Context, pretty_record};
use crate::output::{CliError, render_mode};
use anyhow::Result;
use clap::Args;
use larder_core::error::ErrorCode;

#[derive(Args, Debug)]
pub struct PriorityArgs {
    /// Ingredient name (any letter case).
    pub name: String,
}

pub fn run_priority(args: &PriorityArgs, ctx: &Context) -> Result<()> {
    let mut store = ctx.open_store()?;
    let toggled = store.toggle_priority(&args.name)?;
    store.close()?;

    let Some(record) = toggled else {
        return Err(CliError::coded(
            ErrorCode::ItemNotFound,
            format!("no stocked item named '{}'", args.name.trim()),
        )
        .into());
    };

    if ctx.reports() {
        render_mode(
            ctx.output,
            &record,
            |r, w| writeln!(w, "{}\t{}", r.name, r.is_priority),
            |r, w| {
                let state = if r.is_priority { "now" } else { "no longer" };
                writeln!(w, "{} is {state} flagged to use soon", r.name)?;
                pretty_record(w, r)
            },
        )?;
    }
    Ok(())
}
