mod config;

pub use config::{CacheConfig, Config, InsightsConfig, SourceConfig, SourceKind, UserConfig};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `WORKHEALTH_DATA_DIR` overrides the location. Otherwise this is
/// `~/.config/workhealth/`, or `~/.config/workhealth-dev/` when
/// `WORKHEALTH_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("WORKHEALTH_DATA_DIR") {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("WORKHEALTH_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("workhealth-dev")
            } else {
                base_dir.join("workhealth")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
