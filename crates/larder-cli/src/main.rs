#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use cmd::Context;
use larder_core::config::resolve_config;
use larder_core::error::ErrorCode;
use output::{CliError, OutputMode, cli_error_for, render_error};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "larder",
    author,
    version,
    about = "larder: track what's in the kitchen and plan meals around what expires first",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Inventory database file (overrides LARDER_DB and the config file).
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, conflicts_with = "format")]
    json: bool,

    /// Suppress confirmations (JSON output is never suppressed).
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Output format requested on the command line, if any.
    fn format_flag(&self) -> Option<&'static str> {
        if self.json {
            Some(OutputMode::Json.as_str())
        } else {
            self.format.map(OutputMode::as_str)
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Inventory",
        about = "Stock one or more ingredients",
        long_about = "Stock ingredients. Re-adding a name already stocked (in any letter case) refreshes its quantity, flag and time instead of adding a duplicate.",
        after_help = "EXAMPLES:\n    # Stock two items at once\n    larder add \"salmon, spinach\"\n\n    # Stock with a quantity and flag to use soon\n    larder add milk --qty 1L --priority"
    )]
    Add(cmd::add::AddArgs),

    #[command(
        next_help_heading = "Inventory",
        about = "List stocked ingredients, newest first",
        after_help = "EXAMPLES:\n    # Everything\n    larder list\n\n    # Only items to use soon, as JSON\n    larder list --priority --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Inventory",
        about = "Remove an ingredient",
        after_help = "EXAMPLES:\n    larder remove Salmon"
    )]
    Remove(cmd::remove::RemoveArgs),

    #[command(
        next_help_heading = "Inventory",
        about = "Toggle an ingredient's \"use soon\" flag",
        after_help = "EXAMPLES:\n    larder priority spinach"
    )]
    Priority(cmd::priority::PriorityArgs),

    #[command(
        next_help_heading = "Inventory",
        about = "Remove every ingredient",
        long_about = "Remove every ingredient. Asks for confirmation on a terminal; scripts must pass --force.",
        after_help = "EXAMPLES:\n    larder clear --force"
    )]
    Clear(cmd::clear::ClearArgs),

    #[command(
        next_help_heading = "Inventory",
        about = "Stock ingredients from a CSV export or receipt text",
        after_help = "EXAMPLES:\n    # Spreadsheet export\n    larder import --csv pantry.csv\n\n    # OCR output piped in, preview only\n    tesseract receipt.png - | larder import --scan - --dry-run"
    )]
    Import(cmd::import::ImportArgs),

    #[command(
        next_help_heading = "Planning",
        about = "Plan two days of meals around expiring ingredients",
        long_about = "Plan two days of meals. Typed --expiring items come first, then every stocked item flagged to use soon; the rest of the inventory counts as pantry stock.",
        after_help = "EXAMPLES:\n    # Plan from the inventory\n    larder plan\n\n    # Plan from typed lists only\n    larder plan --expiring \"chicken, rice\" --pantry garlic --no-inventory\n\n    # Shareable shopping list\n    larder plan --share"
    )]
    Plan(cmd::plan::PlanArgs),

    #[command(
        next_help_heading = "Planning",
        about = "Show how ingredient names are categorized",
        after_help = "EXAMPLES:\n    larder classify \"black pepper, eggplant\""
    )]
    Classify(cmd::classify::ClassifyArgs),

    #[command(
        next_help_heading = "Planning",
        about = "Suggest known ingredient names for a prefix",
        after_help = "EXAMPLES:\n    larder suggest sa"
    )]
    Suggest(cmd::suggest::SuggestArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Show or change configuration",
        after_help = "EXAMPLES:\n    # Resolved settings\n    larder config show\n\n    # Use another shop for purchase links\n    larder config set shopping.purchase_url \"https://shop.example/search?q=\""
    )]
    Config(cmd::config::ConfigArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    larder completions bash > ~/.local/share/bash-completion/completions/larder"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("LARDER_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "larder=debug,info"
        } else {
            "larder=info,warn"
        })
    });

    let format = env::var("LARDER_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn run(cli: &Cli, ctx: &Context) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Add(args) => cmd::add::run_add(args, ctx),
        Commands::List(args) => cmd::list::run_list(args, ctx),
        Commands::Remove(args) => cmd::remove::run_remove(args, ctx),
        Commands::Priority(args) => cmd::priority::run_priority(args, ctx),
        Commands::Clear(args) => cmd::clear::run_clear(args, ctx),
        Commands::Import(args) => cmd::import::run_import(args, ctx),
        Commands::Plan(args) => cmd::plan::run_plan(args, ctx),
        Commands::Classify(args) => cmd::classify::run_classify(args, ctx),
        Commands::Suggest(args) => cmd::suggest::run_suggest(args, ctx),
        Commands::Config(args) => cmd::config::run_config(args, ctx),
        Commands::Completions(args) => {
            cmd::completions::run_completions(args.shell, &mut Cli::command())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Until the config resolves, only the flags say what format errors use.
    let flag_mode = if cli.json {
        OutputMode::Json
    } else {
        cli.format.unwrap_or(OutputMode::Text)
    };

    let config = match resolve_config(cli.db.as_deref(), cli.format_flag()) {
        Ok(config) => config,
        Err(err) => {
            let error = CliError::coded(ErrorCode::ConfigParseError, format!("{err:#}"));
            let _ = render_error(flag_mode, &error);
            return ExitCode::FAILURE;
        }
    };
    debug!(store = %config.store_path.display(), output = %config.resolved_output, "resolved config");

    let ctx = Context {
        output: OutputMode::from_resolved(&config.resolved_output),
        quiet: cli.quiet,
        config,
    };

    match run(&cli, &ctx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!(error = ?err, "command failed");
            let _ = render_error(ctx.output, &cli_error_for(&err));
            ExitCode::FAILURE
        }
    }
}
