use anyhow::{Context as _, Result, anyhow, bail};
use clap::{Args, Subcommand};
use larder_core::config::{EffectiveConfig, user_config_path};
use std::path::{Path, PathBuf};
use toml::Value;

use super::Context;
use crate::output::OutputMode;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Show resolved or raw configuration
    Show(ShowArgs),
    /// Set a key in the user config file
    Set(SetArgs),
    /// Remove a key from the user config file
    Unset(UnsetArgs),
}

#[derive(Args, Debug)]
struct ShowArgs {
    /// Show the raw user config file instead of resolved settings
    #[arg(long)]
    raw: bool,
}

#[derive(Args, Debug)]
struct SetArgs {
    /// Key (output, store.path, shopping.purchase_url)
    key: String,

    /// New value
    value: String,
}

#[derive(Args, Debug)]
struct UnsetArgs {
    /// Key (output, store.path, shopping.purchase_url)
    key: String,
}

pub fn run_config(args: &ConfigArgs, ctx: &Context) -> Result<()> {
    match &args.command {
        ConfigCommand::Show(show) => run_show(show, ctx),
        ConfigCommand::Set(set) => run_set(set, ctx.output),
        ConfigCommand::Unset(unset) => run_unset(unset, ctx.output),
    }
}

fn run_show(args: &ShowArgs, ctx: &Context) -> Result<()> {
    if args.raw {
        let value = load_toml_table(&config_file()?)?;
        print_toml_or_json(&value, ctx.output)?;
        return Ok(());
    }
    print_effective(&ctx.config, ctx.output)
}

fn run_set(args: &SetArgs, output: OutputMode) -> Result<()> {
    let path = config_file()?;
    let mut value = load_toml_table(&path)?;
    apply_set(&mut value, &args.key, &args.value)?;
    write_toml_table(&path, &value)?;
    render_mutation(output, "set", &args.key, &path)
}

fn run_unset(args: &UnsetArgs, output: OutputMode) -> Result<()> {
    let path = config_file()?;
    let mut value = load_toml_table(&path)?;
    apply_unset(&mut value, &args.key)?;
    write_toml_table(&path, &value)?;
    render_mutation(output, "unset", &args.key, &path)
}

fn config_file() -> Result<PathBuf> {
    user_config_path().ok_or_else(|| anyhow!("Unable to resolve user config directory"))
}

/// Split a supported key into its optional table and leaf.
fn split_known_key(key: &str) -> Result<(Option<&str>, &str)> {
    match key.split_once('.') {
        None if key == "output" => Ok((None, key)),
        Some((section, leaf @ "path")) if section == "store" => Ok((Some(section), leaf)),
        Some((section, leaf @ "purchase_url")) if section == "shopping" => {
            Ok((Some(section), leaf))
        }
        _ => bail!("Unsupported key `{key}` (expected output, store.path or shopping.purchase_url)"),
    }
}

fn parse_value(key: &str, raw: &str) -> Result<Value> {
    let raw = raw.trim();
    if raw.is_empty() {
        bail!("{key} expects a non-empty value");
    }
    if key == "output" && !matches!(raw, "pretty" | "text" | "json") {
        bail!("output expects pretty, text or json");
    }
    Ok(Value::String(raw.to_string()))
}

fn apply_set(root: &mut Value, key: &str, raw: &str) -> Result<()> {
    let (section, leaf) = split_known_key(key)?;
    let parsed = parse_value(key, raw)?;

    let table = root
        .as_table_mut()
        .ok_or_else(|| anyhow!("Config root must be a TOML table"))?;

    let Some(section) = section else {
        table.insert(leaf.to_string(), parsed);
        return Ok(());
    };

    let section_table = table
        .entry(section.to_string())
        .or_insert_with(|| Value::Table(toml::map::Map::new()))
        .as_table_mut()
        .ok_or_else(|| anyhow!("Section {section} must be a TOML table"))?;
    section_table.insert(leaf.to_string(), parsed);
    Ok(())
}

fn apply_unset(root: &mut Value, key: &str) -> Result<()> {
    let (section, leaf) = split_known_key(key)?;
    let table = root
        .as_table_mut()
        .ok_or_else(|| anyhow!("Config root must be a TOML table"))?;

    let Some(section) = section else {
        table.remove(leaf);
        return Ok(());
    };

    if let Some(section_entry) = table.get_mut(section)
        && let Some(section_table) = section_entry.as_table_mut()
    {
        section_table.remove(leaf);
        if section_table.is_empty() {
            table.remove(section);
        }
    }
    Ok(())
}

fn load_toml_table(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Ok(Value::Table(toml::map::Map::new()));
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let value: Value =
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;

    if !value.is_table() {
        bail!("{} must contain a top-level TOML table", path.display());
    }
    Ok(value)
}

fn write_toml_table(path: &Path, value: &Value) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let serialized = toml::to_string_pretty(value)?;
    std::fs::write(path, serialized).with_context(|| format!("Failed to write {}", path.display()))
}

fn print_toml_or_json(value: &Value, output: OutputMode) -> Result<()> {
    match output {
        OutputMode::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputMode::Text | OutputMode::Pretty => print!("{}", toml::to_string_pretty(value)?),
    }
    Ok(())
}

fn print_effective(value: &EffectiveConfig, output: OutputMode) -> Result<()> {
    let config_path = value
        .config_path
        .as_deref()
        .map_or_else(|| "(none)".to_string(), |p| p.display().to_string());

    match output {
        OutputMode::Json => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        OutputMode::Text => {
            println!("config_path={config_path}");
            println!("resolved_output={}", value.resolved_output);
            println!("store.path={}", value.store_path.display());
            println!("shopping.purchase_url={}", value.user.shopping.purchase_url);
        }
        OutputMode::Pretty => {
            println!("# config file: {config_path}");
            println!("output = \"{}\"", value.resolved_output);
            println!();
            println!("[store]");
            println!("path = \"{}\"", value.store_path.display());
            println!();
            println!("[shopping]");
            println!("purchase_url = \"{}\"", value.user.shopping.purchase_url);
        }
    }
    Ok(())
}

fn render_mutation(output: OutputMode, action: &str, key: &str, path: &Path) -> Result<()> {
    match output {
        OutputMode::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "ok": true,
                    "action": action,
                    "key": key,
                    "path": path,
                }))?
            );
        }
        OutputMode::Text => {
            println!("ok=true action={action} key={key}");
        }
        OutputMode::Pretty => {
            let title = if action == "set" { "Set" } else { "Unset" };
            println!("{title} {key} in {}", path.display());
        }
    }
    Ok(())
}
