//! `clove deploy`: replace the bot's global command set.

use std::path::Path;

use anyhow::{Context, Result};
use clove_channels::{deploy, snowflake};
use clove_commands::{builtin_catalog, CommandRegistry};
use clove_config::{CloveConfig, ValidationReport};
use serenity::all::{ApplicationId, Http};

use crate::terminal_output::{heading, note_info, note_success, note_warn, print_findings};

/// Config findings are shown but never block a deploy; only the token and
/// application id are needed here.
pub async fn run(config: &CloveConfig, report: &ValidationReport, records_path: &Path) -> Result<()> {
    print_findings(report);
    let token = config
        .discord
        .token
        .as_deref()
        .context("discord.token (DISCORD_TOKEN) is required to deploy")?;
    let application_id = config
        .discord
        .application_id
        .as_deref()
        .context("discord.application_id (CLIENT_ID) is required to deploy")?;

    let http = Http::new(token);
    http.set_application_id(ApplicationId::from(snowflake(application_id)?));

    let registry = CommandRegistry::load(builtin_catalog());
    note_info(&format!("Deploying {} commands", registry.len()));

    let report = deploy(&http, &registry, records_path).await?;

    heading("Commands");
    for line in &report.lines {
        println!("{line}");
    }
    if !report.removed.is_empty() {
        heading("Removed");
        for key in &report.removed {
            note_warn(&format!("/{key}"));
        }
    }

    note_success(&format!(
        "Deployed {} commands; IDs saved to {}",
        report.lines.len(),
        records_path.display()
    ));
    Ok(())
}
