//! Cross-Platform Path Utilities
//!
//! Resolves the dashboard's per-user directory (~/.campaign-dashboard/).

use std::path::Path;
use std::path::PathBuf;

use crate::utils::error::{AppError, AppResult};

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the dashboard directory (~/.campaign-dashboard/)
pub fn dashboard_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(".campaign-dashboard"))
}

/// Get the config file path (~/.campaign-dashboard/config.json)
pub fn config_path() -> AppResult<PathBuf> {
    Ok(dashboard_dir()?.join("config.json"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
