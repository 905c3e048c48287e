mod context;
mod currency;
mod draft;

pub use context::AppContext;
pub use currency::{default_currency, find_currency, Currency, CURRENCIES};
pub use draft::{clear_draft, draft_path, load_draft, save_draft, Draft};

use crate::error::{InvoiceError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub api: ApiSettings,
    pub invoice: InvoiceSettings,
    pub output: OutputSettings,
    #[serde(default)]
    pub account: AccountSettings,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ApiSettings {
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

#[derive(Debug, Deserialize, Serialize)]
pub struct InvoiceSettings {
    pub currency: String,
    #[serde(default)]
    pub due_days: u32,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct OutputSettings {
    pub dir: String,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct AccountSettings {
    #[serde(default)]
    pub user_id: Option<String>,
}

impl Config {
    /// Build the command context, letting a currency picked for the current
    /// draft override the configured default.
    pub fn context(&self, currency_override: Option<&str>) -> Result<AppContext> {
        let code = currency_override.unwrap_or(&self.invoice.currency);
        AppContext::new(code, self.account.user_id.clone())
    }
}

/// Get the config directory path (~/.invoicer/)
pub fn config_dir() -> Result<PathBuf> {
    // First try XDG-style directories
    if let Some(proj_dirs) = ProjectDirs::from("", "", "invoicer") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    // Fallback to ~/.invoicer/
    let home = dirs_home().ok_or_else(|| {
        InvoiceError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".invoicer"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Resolve the output directory; relative paths are taken from the config dir.
pub fn resolve_output_dir(dir: &str, cfg_dir: &Path) -> PathBuf {
    let path = expand_path(dir);
    if path.is_absolute() {
        path
    } else {
        cfg_dir.join(path)
    }
}

/// Load the main config.toml
pub fn load_config(cfg_dir: &Path) -> Result<Config> {
    let path = cfg_dir.join("config.toml");
    if !path.exists() {
        return Err(InvoiceError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| InvoiceError::ConfigParse { path, source: e })
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[api]
base_url = "http://localhost:5000"
timeout_secs = 30

[invoice]
currency = "USD"   # see 'invoicer currency' for supported codes
due_days = 30      # due date = issue date + due_days when not set explicitly

[output]
dir = "output"     # relative to this directory, or an absolute/~ path

[account]
# user_id = "your-account-id"   # needed for save, invoices, load and subscription
"#;
