//! `larder import`: stock items from a spreadsheet export or receipt text.

use super::{Context, RecordRow};
use crate::output::{CliError, OutputMode, pretty_section, render, render_list, write_list};
use anyhow::{Context as _, Result};
use clap::Args;
use larder_core::error::ErrorCode;
use larder_core::ingest::{IngestEntry, parse_scanned_text, read_csv};
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Spreadsheet exported as CSV (`name,quantity` rows). `-` reads stdin.
    #[arg(long, value_name = "PATH", required_unless_present = "scan")]
    pub csv: Option<PathBuf>,

    /// Receipt text from an OCR tool. `-` reads stdin.
    #[arg(long, value_name = "PATH", conflicts_with = "csv")]
    pub scan: Option<PathBuf>,

    /// Flag every imported item as "use soon".
    #[arg(long, short)]
    pub priority: bool,

    /// Show what would be stocked without writing anything.
    #[arg(long)]
    pub dry_run: bool,
}

fn open_source(path: &Path) -> Result<Box<dyn Read>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path).map_err(|err| {
        CliError::coded(
            ErrorCode::ImportReadFailed,
            format!("cannot read {}: {err}", path.display()),
        )
    })?;
    Ok(Box::new(BufReader::new(file)))
}

fn import_failed(path: &Path, err: &anyhow::Error) -> anyhow::Error {
    CliError::coded(
        ErrorCode::ImportReadFailed,
        format!("cannot import {}: {err:#}", path.display()),
    )
    .into()
}

fn read_entries(args: &ImportArgs) -> Result<Vec<IngestEntry>> {
    if let Some(path) = &args.csv {
        return read_csv(open_source(path)?).map_err(|err| import_failed(path, &err));
    }
    if let Some(path) = &args.scan {
        let mut text = String::new();
        open_source(path)?
            .read_to_string(&mut text)
            .map_err(|err| import_failed(path, &err.into()))?;
        return Ok(parse_scanned_text(&text));
    }
    Ok(Vec::new())
}

pub fn run_import(args: &ImportArgs, ctx: &Context) -> Result<()> {
    let entries = read_entries(args)?;

    if args.dry_run {
        render(ctx.output, &entries, |entries, w| {
            for entry in entries {
                writeln!(
                    w,
                    "{}\t{}",
                    entry.name,
                    entry.quantity.as_deref().unwrap_or("-")
                )?;
            }
            Ok(())
        })?;
        return Ok(());
    }

    let mut store = ctx.open_store()?;
    let mut stocked = Vec::with_capacity(entries.len());
    for entry in &entries {
        let record = store
            .upsert(&entry.name, entry.quantity.as_deref(), args.priority)
            .with_context(|| format!("importing '{}'", entry.name))?;
        stocked.push(record);
    }
    store.close()?;
    info!(
        count = stocked.len(),
        source = if args.csv.is_some() { "csv" } else { "scan" },
        "imported items"
    );

    if !ctx.reports() {
        return Ok(());
    }
    let rows: Vec<RecordRow<'_>> = stocked.iter().map(RecordRow).collect();
    if ctx.output == OutputMode::Pretty {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        if rows.is_empty() {
            writeln!(out, "Nothing recognizable to import.")?;
            return Ok(());
        }
        pretty_section(&mut out, &format!("Imported {} item(s)", rows.len()))?;
        write_list(&mut out, &rows, OutputMode::Pretty)?;
        return Ok(());
    }
    render_list(&rows, ctx.output)?;
    Ok(())
}
