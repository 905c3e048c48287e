//! Local snapshot of the invoice being edited, kept between commands.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{InvoiceError, Result};
use crate::invoice::InvoiceForm;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Draft {
    /// Currency picked for this invoice; falls back to config when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default)]
    pub form: InvoiceForm,
}

pub fn draft_path(cfg_dir: &Path) -> PathBuf {
    cfg_dir.join("draft.toml")
}

/// Load draft.toml (a fresh draft if missing)
pub fn load_draft(cfg_dir: &Path) -> Result<Draft> {
    let path = draft_path(cfg_dir);
    if !path.exists() {
        return Ok(Draft::default());
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| InvoiceError::ConfigParse { path, source: e })
}

pub fn save_draft(cfg_dir: &Path, draft: &Draft) -> Result<()> {
    let path = draft_path(cfg_dir);
    let content = toml::to_string_pretty(draft)?;
    fs::write(&path, content)?;
    tracing::debug!(path = %path.display(), "draft saved");
    Ok(())
}

pub fn clear_draft(cfg_dir: &Path) -> Result<()> {
    let path = draft_path(cfg_dir);
    if path.exists() {
        fs::remove_file(&path)?;
        tracing::debug!(path = %path.display(), "draft cleared");
    }
    Ok(())
}
