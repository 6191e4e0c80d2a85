use crate::output::{Renderable, render_list};
use anyhow::Result;
use clap::Args;
use larder_core::classify::{Category, classify};
use larder_core::ingest::parse_list;
use larder_core::shopping::Bucket;
use serde::Serialize;
use std::io::{self, Write};

use super::Context;

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Ingredient names (comma-separated lists are split).
    #[arg(required = true, value_name = "NAME")]
    pub names: Vec<String>,
}

/// Classifier verdict for one name.
#[derive(Debug, Serialize)]
struct ClassifyRow {
    name: String,
    category: Category,
    storage_hint: &'static str,
    bucket: Bucket,
}

impl ClassifyRow {
    fn for_name(name: String) -> Self {
        let profile = classify(&name);
        Self {
            name,
            category: profile.category,
            storage_hint: profile.storage_hint,
            bucket: Bucket::for_category(profile.category),
        }
    }
}

impl Renderable for ClassifyRow {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "{:<20} {:<8} {}", self.name, self.category, self.storage_hint)
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        let json = serde_json::to_string(self).map_err(io::Error::other)?;
        write!(w, "{json}")
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}\t{}\t{}\t{}",
            self.name, self.category, self.bucket, self.storage_hint
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["NAME", "CATEGORY", "BUCKET", "STORAGE_HINT"]
    }
}

pub fn run_classify(args: &ClassifyArgs, ctx: &Context) -> Result<()> {
    let rows: Vec<ClassifyRow> = args
        .names
        .iter()
        .flat_map(|arg| parse_list(arg))
        .map(ClassifyRow::for_name)
        .collect();
    render_list(&rows, ctx.output)?;
    Ok(())
}
