//! Config validation with user-friendly messages.

use crate::schema::CloveConfig;
use thiserror::Error;

/// A problem found at a dotted config path.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// Errors stop `clove run`; warnings only disable a feature.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError { path: path.into(), message: message.into() });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError { path: path.into(), message: message.into() });
    }
}

fn blank(value: Option<&str>) -> bool {
    value.map(str::trim).map(str::is_empty).unwrap_or(true)
}

pub fn validate(config: &CloveConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_discord(config, &mut report);
    validate_auth(config, &mut report);
    validate_front(config, &mut report);
    validate_hytale(config, &mut report);
    report
}

fn validate_discord(config: &CloveConfig, report: &mut ValidationReport) {
    if blank(config.discord.token.as_deref()) {
        report.error("discord.token", "Discord bot token is required");
    }
}

fn validate_auth(config: &CloveConfig, report: &mut ValidationReport) {
    let auth = &config.auth;
    let Some(owner) = auth.owner_id.as_deref().filter(|id| !id.trim().is_empty()) else {
        report.error("auth.owner_id", "Owner id is required; nobody could use the bot");
        return;
    };
    for (i, friend) in auth.friend_ids.iter().enumerate() {
        if friend == owner {
            report.warn(format!("auth.friend_ids[{i}]"), "Owner is also listed as a friend");
        }
    }
}

fn validate_front(config: &CloveConfig, report: &mut ValidationReport) {
    if blank(config.front.token.as_deref()) {
        report.warn("front.token", "No front API token; /dough commands will fail");
    }
    if config.front.timeout_secs == 0 {
        report.error("front.timeout_secs", "timeout_secs must be >= 1");
    }
}

fn validate_hytale(config: &CloveConfig, report: &mut ValidationReport) {
    if config.hytale.credentials().is_none() {
        report.warn("hytale", "No Hytale login; username checks use the public checker");
    }
}
