mod history;
mod settings;
mod store;

pub use history::{HistoryRecord, HistoryStats, Outcome};
pub use settings::{SettingKey, Settings};
pub use store::{Store, STORE_FILE_NAME};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/annoyer[-dev]/` based on ANNOYER_ENV.
///
/// Set ANNOYER_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("ANNOYER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("annoyer-dev")
    } else {
        base_dir.join("annoyer")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
