//! `clove-config` — Clove runtime configuration.
//!
//! Provides:
//! - Typed config schema with defaults
//! - YAML loading with `${ENV_VAR}` substitution
//! - Environment-only fallback when no file exists
//! - Validation and redaction for display

pub mod env;
pub mod error;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use env::{collect_referenced_vars, resolve_env_vars, resolve_env_vars_with};
pub use error::ConfigError;
pub use io::{config_dir, config_file_path, load_config_value};
pub use redact::{redact, REDACTED};
pub use schema::{
    AuthConfig, BotConfig, CloveConfig, DiscordConfig, FrontConfig, HytaleConfig, LoggingConfig,
    NotifyConfig,
};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use std::collections::HashMap;
use std::path::Path;

/// A loaded config together with what validation found in it.
#[derive(Debug)]
pub struct Prepared {
    pub config: CloveConfig,
    pub report: ValidationReport,
    /// No file existed; every value came from the environment.
    pub from_env: bool,
}

impl Prepared {
    /// Emit the findings as tracing events. Call once a subscriber is installed.
    pub fn log_findings(&self, path: &Path) {
        if self.from_env {
            tracing::info!(path = %path.display(), "No config file; read environment");
        }
        for warning in &self.report.warnings {
            tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
        }
        for error in &self.report.errors {
            tracing::error!(path = %error.path, message = %error.message, "Config error");
        }
    }
}

/// Load the file at `path`, substitute env vars, and validate.
///
/// Falls back to [`CloveConfig::from_env`] when the file does not exist.
/// Nothing is logged here; the caller decides when findings are shown.
pub async fn load_and_prepare(path: &Path) -> Result<Prepared, ConfigError> {
    load_and_prepare_with(path, &std::env::vars().collect()).await
}

pub async fn load_and_prepare_with(
    path: &Path,
    env: &HashMap<String, String>,
) -> Result<Prepared, ConfigError> {
    let (config, from_env) = match load_config_value(path).await? {
        Some(value) => {
            let value = resolve_env_vars_with(&value, env)?;
            (serde_json::from_value(value)?, false)
        }
        None => (CloveConfig::from_env_map(env), true),
    };

    let report = validate(&config);
    Ok(Prepared { config, report, from_env })
}
