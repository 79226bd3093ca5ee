//! Global command deployment and the local `command-ids.json` record.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clove_commands::{CommandDefinition, CommandKind, CommandRegistry};
use serde::{Deserialize, Serialize};
use serde_json::json;
use serenity::all::{Command, CommandOptionType, CommandType, Http};
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::discord_slash::build_commands;

pub const RECORDS_FILE_NAME: &str = "command-ids.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubcommandRecord {
    /// Discord does not give subcommands their own ids; always `"N/A"`.
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRecord {
    pub id: String,
    pub name: String,
    pub version: String,
    pub deployed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<SubcommandRecord>,
}

pub type Records = BTreeMap<String, CommandRecord>;

/// Record key: the bare name for slash commands, `"Name (user)"` /
/// `"Name (message)"` for context menus so both flavours get their own entry.
pub fn record_key(kind: CommandKind, name: &str) -> String {
    match kind {
        CommandKind::ChatInput => name.to_string(),
        other => format!("{name} ({})", other.label()),
    }
}

/// First 8 hex chars of a SHA-256 over name, description and options.
pub fn command_version(def: &CommandDefinition) -> String {
    let options = if def.is_grouped() {
        serde_json::to_value(&def.subcommands)
    } else {
        serde_json::to_value(&def.options)
    }
    .unwrap_or_default();
    let structure = json!({ "name": def.name, "description": def.description, "options": options });
    let digest = Sha256::digest(structure.to_string().as_bytes());
    hex::encode(digest)[..8].to_string()
}

/// Missing or empty file means nothing was deployed yet. A corrupt file is
/// logged and treated the same way.
pub async fn load_records(path: &Path) -> Records {
    let raw = match fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(_) => {
            debug!(path = %path.display(), "No command records yet");
            return Records::new();
        }
    };
    if raw.trim().is_empty() {
        return Records::new();
    }
    match serde_json::from_str(&raw) {
        Ok(records) => records,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not parse command records");
            Records::new()
        }
    }
}

/// Write atomically: temp file, then rename.
pub async fn save_records(path: &Path, records: &Records) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create records directory: {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(records).context("Failed to serialize command records")?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json.as_bytes())
        .await
        .with_context(|| format!("Failed to write temp records: {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("Failed to rename temp records to: {}", path.display()))?;
    info!(path = %path.display(), "Saved command IDs");
    Ok(())
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// A command as Discord reports it after deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedCommand {
    pub id: String,
    pub kind: CommandKind,
    pub name: String,
    pub subcommands: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    New,
    /// Same key, different id: the command was recreated.
    Changed { previous_id: String },
    /// Same id, different definition.
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub key: String,
    pub id: String,
    pub change: Change,
    /// Subcommand names paired with whether they are new.
    pub subcommands: Vec<(String, bool)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployReport {
    pub lines: Vec<ReportLine>,
    pub removed: Vec<String>,
}

/// Compare what Discord now holds against the previous records. Returns the
/// new records alongside a per-command report.
pub fn reconcile(
    previous: &Records,
    deployed: &[DeployedCommand],
    registry: &CommandRegistry,
    now: DateTime<Utc>,
) -> (Records, DeployReport) {
    let mut records = Records::new();
    let mut report = DeployReport::default();

    for cmd in deployed {
        let key = record_key(cmd.kind, &cmd.name);
        let version = registry
            .get(cmd.kind, &cmd.name)
            .map(command_version)
            .unwrap_or_else(|| "unknown".to_string());
        let old = previous.get(&key);

        let change = match old {
            None => Change::New,
            Some(old) if old.id != cmd.id => Change::Changed { previous_id: old.id.clone() },
            Some(old) if old.version != version => Change::Updated,
            Some(_) => Change::Unchanged,
        };
        let subcommands = cmd
            .subcommands
            .iter()
            .map(|name| {
                let known = old.is_some_and(|o| o.subcommands.iter().any(|s| &s.name == name));
                (name.clone(), !known)
            })
            .collect();

        records.insert(
            key.clone(),
            CommandRecord {
                id: cmd.id.clone(),
                name: cmd.name.clone(),
                version,
                deployed_at: now,
                subcommands: cmd
                    .subcommands
                    .iter()
                    .map(|name| SubcommandRecord { id: "N/A".to_string(), name: name.clone() })
                    .collect(),
            },
        );
        report.lines.push(ReportLine { key, id: cmd.id.clone(), change, subcommands });
    }

    report.removed = previous.keys().filter(|k| !records.contains_key(*k)).cloned().collect();
    (records, report)
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = format!("/{:<20}", self.key);
        match &self.change {
            Change::New => write!(f, "✨ NEW: {name} ID: {}", self.id)?,
            Change::Changed { previous_id } => {
                write!(f, "🔄 CHANGED: {name} ID: {} (was: {previous_id})", self.id)?
            }
            Change::Updated => write!(f, "📝 UPDATED: {name} ID: {} (version changed)", self.id)?,
            Change::Unchanged => write!(f, "✓ {name} ID: {}", self.id)?,
        }
        for (sub, new) in &self.subcommands {
            write!(f, "\n   {} {sub}", if *new { "✨" } else { "✓" })?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Deployment
// ---------------------------------------------------------------------------

fn command_kind(kind: CommandType) -> Option<CommandKind> {
    match kind {
        CommandType::ChatInput => Some(CommandKind::ChatInput),
        CommandType::User => Some(CommandKind::User),
        CommandType::Message => Some(CommandKind::Message),
        _ => None,
    }
}

fn deployed(command: &Command) -> Option<DeployedCommand> {
    Some(DeployedCommand {
        id: command.id.to_string(),
        kind: command_kind(command.kind)?,
        name: command.name.clone(),
        subcommands: command
            .options
            .iter()
            .filter(|o| o.kind == CommandOptionType::SubCommand)
            .map(|o| o.name.clone())
            .collect(),
    })
}

/// Replace the global command set with the registry's and update the
/// records file. `http` must carry the application id.
pub async fn deploy(http: &Http, registry: &CommandRegistry, records_path: &Path) -> Result<DeployReport> {
    let commands = build_commands(registry);
    info!(count = commands.len(), "Started refreshing application commands");

    let previous = load_records(records_path).await;
    info!(count = previous.len(), "Loaded existing command IDs");

    let existing = Command::get_global_commands(http)
        .await
        .context("Failed to fetch existing commands")?;
    info!(count = existing.len(), "Found existing commands on Discord");
    for cmd in existing.iter().filter_map(deployed) {
        let key = record_key(cmd.kind, &cmd.name);
        if let Some(local) = previous.get(&key).filter(|r| r.id != cmd.id) {
            warn!(
                command = %key,
                local = %local.id,
                discord = %cmd.id,
                "Command ID mismatch; it may have been recreated externally"
            );
        }
    }

    let result = Command::set_global_commands(http, commands)
        .await
        .context("Failed to deploy commands")?;
    info!(count = result.len(), "Deployed application commands");

    let deployed: Vec<_> = result.iter().filter_map(deployed).collect();
    let (records, report) = reconcile(&previous, &deployed, registry, Utc::now());
    save_records(records_path, &records).await?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clove_commands::builtin_catalog;

    fn registry() -> CommandRegistry {
        CommandRegistry::load(builtin_catalog())
    }

    fn deployed_cmd(id: &str, kind: CommandKind, name: &str, subs: &[&str]) -> DeployedCommand {
        DeployedCommand {
            id: id.into(),
            kind,
            name: name.into(),
            subcommands: subs.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn version_is_stable_and_sensitive_to_changes() {
        let registry = registry();
        let dough = registry.get(CommandKind::ChatInput, "dough").unwrap();
        let fun = registry.get(CommandKind::ChatInput, "fun").unwrap();

        let v = command_version(dough);
        assert_eq!(v.len(), 8);
        assert!(v.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(v, command_version(dough));
        assert_ne!(v, command_version(fun));
    }

    #[test]
    fn context_menus_get_distinct_keys() {
        assert_eq!(record_key(CommandKind::ChatInput, "dough"), "dough");
        assert_eq!(record_key(CommandKind::User, "Cheese"), "Cheese (user)");
        assert_eq!(record_key(CommandKind::Message, "Cheese"), "Cheese (message)");
    }

    #[test]
    fn reconcile_classifies_every_command() {
        let registry = registry();
        let now = Utc::now();
        let dough_version = command_version(registry.get(CommandKind::ChatInput, "dough").unwrap());

        let mut previous = Records::new();
        let record = |id: &str, name: &str, version: &str| CommandRecord {
            id: id.into(),
            name: name.into(),
            version: version.into(),
            deployed_at: now,
            subcommands: vec![SubcommandRecord { id: "N/A".into(), name: "add".into() }],
        };
        previous.insert("dough".into(), record("1", "dough", &dough_version));
        previous.insert("fun".into(), record("2", "fun", "stale"));
        previous.insert("utils".into(), record("3", "utils", "x"));
        previous.insert("old".into(), record("4", "old", "x"));

        let deployed = vec![
            deployed_cmd("1", CommandKind::ChatInput, "dough", &["add", "remove"]),
            deployed_cmd("2", CommandKind::ChatInput, "fun", &[]),
            deployed_cmd("30", CommandKind::ChatInput, "utils", &[]),
            deployed_cmd("5", CommandKind::User, "Cheese", &[]),
        ];
        let (records, report) = reconcile(&previous, &deployed, &registry, now);

        let changes: Vec<_> = report.lines.iter().map(|l| l.change.clone()).collect();
        assert_eq!(
            changes,
            vec![
                Change::Unchanged,
                Change::Updated,
                Change::Changed { previous_id: "3".into() },
                Change::New,
            ]
        );
        assert_eq!(report.lines[0].subcommands, vec![("add".to_string(), false), ("remove".to_string(), true)]);
        assert_eq!(report.removed, vec!["old".to_string()]);
        assert!(records.contains_key("Cheese (user)"));
        assert_eq!(records["dough"].subcommands.len(), 2);
    }

    #[test]
    fn report_lines_render() {
        let line = ReportLine {
            key: "dough".into(),
            id: "1".into(),
            change: Change::Changed { previous_id: "0".into() },
            subcommands: vec![("add".into(), true)],
        };
        let text = line.to_string();
        assert!(text.starts_with("🔄 CHANGED: /dough"));
        assert!(text.ends_with("(was: 0)\n   ✨ add"));
    }

    #[tokio::test]
    async fn records_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(RECORDS_FILE_NAME);

        assert!(load_records(&path).await.is_empty());

        let mut records = Records::new();
        records.insert(
            "ping".into(),
            CommandRecord {
                id: "9".into(),
                name: "ping".into(),
                version: "abcd1234".into(),
                deployed_at: Utc::now(),
                subcommands: Vec::new(),
            },
        );
        save_records(&path, &records).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("subcommands"));
        assert_eq!(load_records(&path).await, records);
    }

    #[tokio::test]
    async fn corrupt_or_empty_records_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(RECORDS_FILE_NAME);

        std::fs::write(&path, "  \n").unwrap();
        assert!(load_records(&path).await.is_empty());

        std::fs::write(&path, "{not json").unwrap();
        assert!(load_records(&path).await.is_empty());
    }
}
