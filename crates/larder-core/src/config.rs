use crate::db::DEFAULT_DB_FILE;
use crate::shopping::DEFAULT_PURCHASE_URL;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Overrides the user config file location.
pub const CONFIG_ENV: &str = "LARDER_CONFIG";
/// Overrides the inventory database location.
pub const DB_ENV: &str = "LARDER_DB";
/// Overrides the output mode.
pub const FORMAT_ENV: &str = "LARDER_FORMAT";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub shopping: ShoppingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingConfig {
    #[serde(default = "default_purchase_url")]
    pub purchase_url: String,
}

impl Default for ShoppingConfig {
    fn default() -> Self {
        Self {
            purchase_url: default_purchase_url(),
        }
    }
}

/// Settings after every layer (flags, env, file, defaults) is applied.
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    /// File the user layer was read from, if one exists.
    pub config_path: Option<PathBuf>,
    pub user: UserConfig,
    pub store_path: PathBuf,
    pub resolved_output: String,
}

/// Location of the user config file: `$LARDER_CONFIG`, else
/// `<config dir>/larder/config.toml`.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("larder/config.toml"))
}

/// Load the user config, falling back to defaults when there is no file.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    match user_config_path() {
        Some(path) => load_config_from(&path),
        None => Ok(UserConfig::default()),
    }
}

/// Load a config file, returning defaults if `path` does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config_from(path: &Path) -> Result<UserConfig> {
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Resolve every layer for one invocation.
///
/// # Errors
///
/// Returns an error if the user config file is present but malformed.
pub fn resolve_config(cli_db: Option<&Path>, cli_format: Option<&str>) -> Result<EffectiveConfig> {
    let config_path = user_config_path().filter(|path| path.exists());
    let user = match &config_path {
        Some(path) => load_config_from(path)?,
        None => UserConfig::default(),
    };

    let env_db = env::var_os(DB_ENV)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from);
    let store_path = resolve_store_path(cli_db, env_db, &user, dirs::data_dir());

    let env_format = env::var(FORMAT_ENV).ok();
    let resolved_output = resolve_output(cli_format, env_format, user.output.clone());

    Ok(EffectiveConfig {
        config_path,
        user,
        store_path,
        resolved_output,
    })
}

/// Flag, then environment, then config file, then the platform data dir,
/// then `./.larder/`.
fn resolve_store_path(
    cli_db: Option<&Path>,
    env_db: Option<PathBuf>,
    user: &UserConfig,
    data_dir: Option<PathBuf>,
) -> PathBuf {
    cli_db
        .map(Path::to_path_buf)
        .or(env_db)
        .or_else(|| user.store.path.clone())
        .or_else(|| data_dir.map(|dir| dir.join("larder").join(DEFAULT_DB_FILE)))
        .unwrap_or_else(|| PathBuf::from(".larder").join(DEFAULT_DB_FILE))
}

fn resolve_output(
    cli_format: Option<&str>,
    env_format: Option<String>,
    user_output: Option<String>,
) -> String {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" => Some("pretty"),
            "text" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    let layered = cli_format
        .and_then(normalize_output_mode)
        .or_else(|| env_format.as_deref().and_then(normalize_output_mode))
        .or_else(|| user_output.as_deref().and_then(normalize_output_mode));

    if let Some(mode) = layered {
        return mode.to_string();
    }

    if std::io::stdout().is_terminal() {
        "pretty".to_string()
    } else {
        "text".to_string()
    }
}

fn default_purchase_url() -> String {
    DEFAULT_PURCHASE_URL.to_string()
}
