//! `larder plan`: two-day plan for what is about to expire.
//!
//! Typed `--expiring` names come first, followed by every stocked item
//! flagged "use soon". The rest of the inventory counts as pantry stock
//! unless `--no-inventory` is given.

use super::Context;
use crate::output::{CliError, pretty_kv, pretty_section, render_mode};
use anyhow::{Context as _, Result};
use clap::Args;
use larder_core::error::ErrorCode;
use larder_core::ingest::parse_list;
use larder_core::plan::{Plan, PlanBranch, gather_inputs, generate_plan};
use larder_core::shopping::{Bucket, ShoppingGroup, categorize, purchase_link, share_text};
use serde::Serialize;
use std::io::{self, Write};
use tracing::debug;

const NOTHING_TO_BUY: &str = "No extra shopping needed! Use your pantry.";

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Items that must be used up (comma-separated).
    #[arg(long, short, value_name = "LIST")]
    pub expiring: Vec<String>,

    /// Extra pantry items on hand (comma-separated).
    #[arg(long, short, value_name = "LIST")]
    pub pantry: Vec<String>,

    /// Plan from the typed lists only, ignoring the stored inventory.
    #[arg(long)]
    pub no_inventory: bool,

    /// Print the shopping list as shareable plain text only.
    #[arg(long)]
    pub share: bool,
}

#[derive(Debug, Serialize)]
struct ShoppingLine {
    name: String,
    link: String,
}

#[derive(Debug, Serialize)]
struct ShoppingBucket {
    bucket: Bucket,
    items: Vec<ShoppingLine>,
}

#[derive(Debug, Serialize)]
struct PlanReport {
    #[serde(flatten)]
    plan: Plan,
    shopping: Vec<ShoppingBucket>,
}

fn split_all(raw: &[String]) -> Vec<String> {
    raw.iter().flat_map(|arg| parse_list(arg)).collect()
}

fn with_links(groups: &[ShoppingGroup], base: &str) -> Vec<ShoppingBucket> {
    groups
        .iter()
        .map(|group| ShoppingBucket {
            bucket: group.bucket,
            items: group
                .items
                .iter()
                .map(|item| ShoppingLine {
                    name: item.clone(),
                    link: purchase_link(base, item),
                })
                .collect(),
        })
        .collect()
}

pub fn run_plan(args: &PlanArgs, ctx: &Context) -> Result<()> {
    let expiring = split_all(&args.expiring);
    let pantry = split_all(&args.pantry);

    let records = if args.no_inventory {
        Vec::new()
    } else {
        let store = ctx.open_store()?;
        let records = store.get_all();
        store.close()?;
        records
    };

    let inputs = gather_inputs(&expiring, &pantry, &records);
    debug!(
        expiring = inputs.expiring.len(),
        pantry = inputs.pantry.len(),
        "planning"
    );
    if inputs.expiring.is_empty() {
        return Err(CliError::coded(
            ErrorCode::NothingToPlan,
            "nothing is marked as expiring",
        )
        .into());
    }

    let plan = generate_plan(&inputs.expiring, &inputs.pantry);
    let groups = categorize(&plan.shopping_list);

    if args.share {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        if groups.is_empty() {
            writeln!(out, "{NOTHING_TO_BUY}")?;
        } else {
            write!(out, "{}", share_text(&groups))?;
        }
        return Ok(());
    }

    let report = PlanReport {
        shopping: with_links(&groups, &ctx.config.user.shopping.purchase_url),
        plan,
    };
    render_mode(ctx.output, &report, write_text, write_pretty)
        .context("writing the plan")?;
    Ok(())
}

fn write_text(report: &PlanReport, w: &mut dyn Write) -> io::Result<()> {
    let plan = &report.plan;
    writeln!(w, "branch\t{}", plan.branch.map_or("-", PlanBranch::as_str))?;
    writeln!(w, "waste_saved\t{}", plan.waste_saved)?;
    writeln!(w, "day1\t{}\t{}", plan.day1.name, plan.day1.reason)?;
    writeln!(w, "day2\t{}\t{}", plan.day2.name, plan.day2.reason)?;
    writeln!(w, "tip\t{}", plan.tip)?;
    for bucket in &report.shopping {
        for line in &bucket.items {
            writeln!(w, "buy\t{}\t{}\t{}", bucket.bucket, line.name, line.link)?;
        }
    }
    Ok(())
}

fn write_pretty(report: &PlanReport, w: &mut dyn Write) -> io::Result<()> {
    let plan = &report.plan;
    pretty_section(w, "Your two-day plan")?;
    pretty_kv(w, "Day 1", &plan.day1.name)?;
    writeln!(w, "             {}", plan.day1.reason)?;
    pretty_kv(w, "Day 2", &plan.day2.name)?;
    writeln!(w, "             {}", plan.day2.reason)?;
    pretty_kv(w, "Waste saved", &plan.waste_saved)?;
    pretty_kv(w, "Storage tip", &plan.tip)?;
    writeln!(w)?;

    pretty_section(w, "Shopping list")?;
    if report.shopping.is_empty() {
        return writeln!(w, "{NOTHING_TO_BUY}");
    }
    for bucket in &report.shopping {
        writeln!(w, "{}", bucket.bucket)?;
        for line in &bucket.items {
            writeln!(w, "  - {:<16} {}", line.name, line.link)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_core::model::item::PlanItem;
    use larder_core::shopping::DEFAULT_PURCHASE_URL;

    fn report(expiring: &[&str], pantry: &[&str]) -> PlanReport {
        let expiring: Vec<PlanItem> = expiring.iter().map(|n| PlanItem::from(*n)).collect();
        let pantry: Vec<PlanItem> = pantry.iter().map(|n| PlanItem::from(*n)).collect();
        let plan = generate_plan(&expiring, &pantry);
        let groups = categorize(&plan.shopping_list);
        PlanReport {
            shopping: with_links(&groups, DEFAULT_PURCHASE_URL),
            plan,
        }
    }

    #[test]
    fn links_are_url_encoded() {
        let report = report(&["chicken"], &[]);
        let line = report
            .shopping
            .iter()
            .flat_map(|b| &b.items)
            .find(|l| l.name == "Cooking Oil")
            .expect("oil is always needed without a pantry");
        assert_eq!(line.link, "https://blinkit.com/s/?q=Cooking%20Oil");
    }

    #[test]
    fn report_json_flattens_the_plan() {
        let value = serde_json::to_value(report(&["spinach"], &["oil", "garlic"]))
            .expect("serialize");
        assert_eq!(value["branch"], "veg");
        assert!(value["day1"]["name"].is_string());
        assert!(value["shopping"].is_array());
        assert!(value.get("plan").is_none());
    }

    #[test]
    fn pretty_output_reports_empty_shopping() {
        let mut report = report(&["milk"], &[]);
        report.shopping.clear();
        let mut buf = Vec::new();
        write_pretty(&report, &mut buf).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.contains("Day 1:"));
        assert!(text.ends_with("No extra shopping needed! Use your pantry.\n"));
    }

    #[test]
    fn comma_lists_split_across_flags() {
        assert_eq!(
            split_all(&["Salmon, rice".to_string(), "lemon".to_string()]),
            ["salmon", "rice", "lemon"]
        );
    }
}
