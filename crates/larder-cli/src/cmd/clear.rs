//! `larder clear`: empty the inventory.

use super::Context;
use crate::output::{CliError, render};
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::io::{IsTerminal, Write};

#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Skip the confirmation prompt.
    #[arg(long, short)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct ClearResult {
    removed: usize,
}

fn interactive() -> bool {
    std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
}

fn confirm_clear() -> Result<bool> {
    eprint!("Remove every item from the inventory? [y/N] ");
    std::io::stderr().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(is_yes(&input))
}

fn is_yes(input: &str) -> bool {
    let answer = input.trim().to_ascii_lowercase();
    answer == "y" || answer == "yes"
}

pub fn run_clear(args: &ClearArgs, ctx: &Context) -> Result<()> {
    if !args.force {
        if !interactive() {
            let mut err = CliError::new("refusing to clear the inventory without confirmation");
            err.suggestion = Some("Re-run with --force in scripts.".to_string());
            return Err(err.into());
        }
        if !confirm_clear()? {
            eprintln!("Aborted.");
            return Ok(());
        }
    }

    let mut store = ctx.open_store()?;
    let removed = store.clear()?;
    store.close()?;

    if ctx.reports() {
        render(ctx.output, &ClearResult { removed }, |r, w| {
            writeln!(w, "Cleared {} item(s)", r.removed)
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_yes_answers_confirm() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("nope"));
    }
}
