mod config;

pub use config::{Config, DisplayConfig, LogConfig, TimerConfig};

use std::path::PathBuf;

use crate::error::Result;

/// Returns the directory holding `config.toml`, creating it if needed.
///
/// `DEEPWORK_HOME` wins when set. Otherwise `~/.config/deepwork[-dev]/`,
/// with `DEEPWORK_ENV=dev` selecting the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = data_dir_path();
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Same location as [`data_dir`], without touching the filesystem.
pub fn data_dir_path() -> PathBuf {
    match std::env::var_os("DEEPWORK_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("DEEPWORK_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("deepwork-dev")
            } else {
                base_dir.join("deepwork")
            }
        }
    }
}
