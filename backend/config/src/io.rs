//! Config file location and loading.

use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::error::ConfigError;

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Priority: `CLOVE_CONFIG_DIR` env > `~/.clove/`.
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CLOVE_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .map(|home| home.join(".clove"))
        .unwrap_or_else(|| PathBuf::from(".clove"))
}

pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Read the YAML file as an untyped tree, ready for env substitution.
///
/// `Ok(None)` when the file does not exist.
pub async fn load_config_value(path: &Path) -> Result<Option<Value>, ConfigError> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        debug!(path = %path.display(), "Config file does not exist");
        return Ok(None);
    }

    let raw = fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;

    let value: Value = serde_yaml::from_str(&raw)
        .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;

    info!(path = %path.display(), "Loaded config");
    // An empty file parses as null.
    Ok(Some(if value.is_null() { Value::Object(Default::default()) } else { value }))
}
