use super::{Context, RecordRow};
use crate::output::{OutputMode, pretty_rule, pretty_section, render_list, write_list};
use anyhow::Result;
use clap::Args;
use std::io::{self, Write};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only show items flagged "use soon".
    #[arg(long, short)]
    pub priority: bool,

    /// Show at most this many items (newest first).
    #[arg(long, short)]
    pub limit: Option<usize>,
}

pub fn run_list(args: &ListArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let records: Vec<_> = store
        .get_all()
        .into_iter()
        .filter(|r| !args.priority || r.is_priority)
        .take(args.limit.unwrap_or(usize::MAX))
        .collect();
    store.close()?;

    let rows: Vec<RecordRow<'_>> = records.iter().map(RecordRow).collect();
    if ctx.output != OutputMode::Pretty {
        render_list(&rows, ctx.output)?;
        return Ok(());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if rows.is_empty() {
        writeln!(out, "Inventory is empty. Stock something with `larder add`.")?;
        return Ok(());
    }
    let use_soon = records.iter().filter(|r| r.is_priority).count();
    pretty_section(
        &mut out,
        &format!("Inventory: {} item(s), {use_soon} to use soon", rows.len()),
    )?;
    write_list(&mut out, &rows, OutputMode::Pretty)?;
    pretty_rule(&mut out)?;
    writeln!(out, "! = use soon")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn list_args_defaults() {
        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: ListArgs,
        }
        let w = Wrapper::parse_from(["test"]);
        assert!(!w.args.priority);
        assert!(w.args.limit.is_none());

        let w = Wrapper::parse_from(["test", "--priority", "--limit", "3"]);
        assert!(w.args.priority);
        assert_eq!(w.args.limit, Some(3));
    }
}
