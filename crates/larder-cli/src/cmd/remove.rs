use super::Context;
use crate::output::{CliError, render};
use anyhow::Result;
use clap::Args;
use larder_core::error::ErrorCode;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Ingredient name (any letter case).
    pub name: String,
}

#[derive(Debug, Serialize)]
struct RemoveResult<'a> {
    name: &'a str,
    removed: usize,
}

pub fn run_remove(args: &RemoveArgs, ctx: &Context) -> Result<()> {
    let mut store = ctx.open_store()?;
    let removed = store.remove(&args.name)?;
    store.close()?;

    if removed == 0 {
        return Err(CliError::coded(
            ErrorCode::ItemNotFound,
            format!("no stocked item named '{}'", args.name.trim()),
        )
        .into());
    }

    if ctx.reports() {
        let result = RemoveResult {
            name: args.name.trim(),
            removed,
        };
        render(ctx.output, &result, |r, w| writeln!(w, "Removed {}", r.name))?;
    }
    Ok(())
}
