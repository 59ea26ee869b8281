//! Configuration module for mongo-backup
//!
//! Handles loading and validating configuration from a TOML file. The file is
//! read once at startup; missing required fields or a failed validation abort
//! the process before any scheduling begins.

mod loader;
mod types;

pub use loader::{load_config, ConfigError, Result};
pub use types::*;

/// Expand tilde (~) in path
pub fn expand_tilde(path: &std::path::Path) -> std::path::PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}
