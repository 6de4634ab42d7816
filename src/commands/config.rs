use crate::error::{Result, ScanError};
use crate::models::config::AppConfig;
use crate::services::config::ConfigManager;
use std::path::{Path, PathBuf};

/// Config manager for an explicit file, or the platform default location
pub fn config_manager(path: Option<&Path>) -> Result<ConfigManager> {
    match path {
        Some(path) => Ok(ConfigManager::with_path(path)),
        None => ConfigManager::new(),
    }
}

/// Effective configuration as pretty JSON
pub fn show_config(manager: &ConfigManager) -> Result<String> {
    let config = manager.load()?;
    Ok(serde_json::to_string_pretty(&config)?)
}

/// Location of the configuration file
pub fn get_config_path(manager: &ConfigManager) -> PathBuf {
    manager.config_file_path().clone()
}

/// Write the default configuration. An existing file is only replaced
/// when `force` is set.
pub fn init_config(manager: &ConfigManager, force: bool) -> Result<PathBuf> {
    if manager.config_exists() && !force {
        return Err(ScanError::Config(format!(
            "{} already exists (use --force to overwrite)",
            manager.config_file_path().display()
        )));
    }

    manager.save(&AppConfig::default())?;
    tracing::info!(path = %manager.config_file_path().display(), "Wrote default configuration");
    Ok(manager.config_file_path().clone())
}
