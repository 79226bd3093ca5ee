//! `clove config`: show the effective config with secrets masked.

use anyhow::{Context, Result};
use clove_config::{redact, validate, CloveConfig};
use std::path::Path;

use crate::terminal_output::{heading, note_info, print_report};

pub fn run(config: &CloveConfig, path: &Path) -> Result<()> {
    if path.exists() {
        note_info(&format!("Config file: {}", path.display()));
    } else {
        note_info(&format!("No config file at {}; using environment", path.display()));
    }

    heading("Effective config");
    let yaml = serde_yaml::to_string(&redact(config)).context("Failed to render config")?;
    print!("{yaml}");

    heading("Validation");
    print_report(&validate(config));
    Ok(())
}
