/// Command registry.
///
/// Built once at startup from an explicit catalogue and never mutated after.
/// Bad entries are skipped with a warning; the rest of the load carries on.
use std::collections::BTreeMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::{info, warn};

use crate::dispatch::CommandHandler;
use crate::router::{CategoryRouter, Subcommand};
use crate::types::{CommandKind, OptionSchema, SubcommandSchema};

/// Lowercase, 1-32 chars, letters/digits/`-`/`_`.
static SLASH_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-_\p{Ll}\p{N}]{1,32}$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("command has no name")]
    EmptyName,

    #[error("`{0}` is not a valid command name")]
    InvalidName(String),

    #[error("`{0}` has no description")]
    MissingDescription(String),

    #[error("`{0}` is already registered")]
    Duplicate(String),
}

pub(crate) fn validate_name(kind: CommandKind, name: &str) -> Result<(), RegistryError> {
    if name.trim().is_empty() {
        return Err(RegistryError::EmptyName);
    }
    let valid = match kind {
        CommandKind::ChatInput => SLASH_NAME.is_match(name),
        // Context menu names are free text shown in the Apps menu.
        CommandKind::User | CommandKind::Message => name.chars().count() <= 32,
    };
    if !valid {
        return Err(RegistryError::InvalidName(name.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

pub struct CommandDefinition {
    pub name: String,
    pub description: String,
    pub kind: CommandKind,
    /// Options of a unary command. Empty for grouped commands.
    pub options: Vec<OptionSchema>,
    /// Subcommands of a grouped command. Empty for unary commands.
    pub subcommands: Vec<SubcommandSchema>,
    pub handler: Arc<dyn CommandHandler>,
}

impl CommandDefinition {
    pub fn chat_input(name: &str, description: &str, handler: Arc<dyn CommandHandler>) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            kind: CommandKind::ChatInput,
            options: Vec::new(),
            subcommands: Vec::new(),
            handler,
        }
    }

    /// Context menu entry; these carry no description or options.
    pub fn context_menu(kind: CommandKind, name: &str, handler: Arc<dyn CommandHandler>) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            kind,
            options: Vec::new(),
            subcommands: Vec::new(),
            handler,
        }
    }

    pub fn option(mut self, option: OptionSchema) -> Self {
        self.options.push(option);
        self
    }

    pub fn is_grouped(&self) -> bool {
        !self.subcommands.is_empty()
    }

    pub fn validate(&self) -> Result<(), RegistryError> {
        validate_name(self.kind, &self.name)?;
        if self.kind == CommandKind::ChatInput && self.description.trim().is_empty() {
            return Err(RegistryError::MissingDescription(self.name.clone()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for CommandDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDefinition")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("options", &self.options)
            .field("subcommands", &self.subcommands)
            .finish()
    }
}

/// One entry of the static catalogue.
pub enum CatalogEntry {
    /// A standalone command or context menu.
    Command(CommandDefinition),
    /// A slash command grouping several subcommands.
    Category {
        name: String,
        description: String,
        subcommands: Vec<Subcommand>,
    },
}

impl CatalogEntry {
    pub fn category(name: &str, description: &str, subcommands: Vec<Subcommand>) -> Self {
        Self::Category {
            name: name.to_string(),
            description: description.to_string(),
            subcommands,
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Commands keyed by kind and name: a user menu and a message menu may share
/// a display name, two slash commands may not.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: BTreeMap<(CommandKind, String), CommandDefinition>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a catalogue into a registry, skipping entries that fail validation.
    pub fn load(entries: Vec<CatalogEntry>) -> Self {
        let mut registry = Self::new();
        for entry in entries {
            let def = match entry {
                CatalogEntry::Command(def) => def,
                CatalogEntry::Category { name, description, subcommands } => {
                    match Self::build_category(&name, &description, subcommands) {
                        Some(def) => def,
                        None => continue,
                    }
                }
            };

            let label = def.kind.label();
            let name = def.name.clone();
            let sub_count = def.subcommands.len();
            match registry.register(def) {
                Ok(()) if sub_count > 0 => {
                    info!(command = %name, subcommands = sub_count, "Loaded category")
                }
                Ok(()) => info!(command = %name, kind = label, "Loaded command"),
                Err(e) => warn!(command = %name, error = %e, "Skipping command"),
            }
        }
        registry
    }

    fn build_category(
        name: &str,
        description: &str,
        subcommands: Vec<Subcommand>,
    ) -> Option<CommandDefinition> {
        let mut router = CategoryRouter::new(name);
        for sub in subcommands {
            let sub_name = sub.schema.name.clone();
            match router.add(sub) {
                Ok(()) => info!(command = %format!("{name} {sub_name}"), "Loaded subcommand"),
                Err(e) => warn!(category = %name, subcommand = %sub_name, error = %e, "Skipping subcommand"),
            }
        }
        if router.is_empty() {
            warn!(category = %name, "Category has no loadable subcommands");
            return None;
        }

        Some(CommandDefinition {
            name: name.to_string(),
            description: description.to_string(),
            kind: CommandKind::ChatInput,
            options: Vec::new(),
            subcommands: router.schemas(),
            handler: Arc::new(router),
        })
    }

    /// Add one definition. Duplicates are rejected, never overwritten.
    pub fn register(&mut self, def: CommandDefinition) -> Result<(), RegistryError> {
        def.validate()?;
        let key = (def.kind, def.name.clone());
        if self.commands.contains_key(&key) {
            return Err(RegistryError::Duplicate(def.name));
        }
        self.commands.insert(key, def);
        Ok(())
    }

    pub fn get(&self, kind: CommandKind, name: &str) -> Option<&CommandDefinition> {
        self.commands.get(&(kind, name.to_string()))
    }

    pub fn all(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.commands.values()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Silent;

    fn silent() -> Arc<dyn CommandHandler> {
        Arc::new(Silent)
    }

    fn sub(name: &str) -> Subcommand {
        Subcommand::new(SubcommandSchema::new(name, "does a thing"), silent())
    }

    #[test]
    fn loads_commands_and_categories() {
        let registry = CommandRegistry::load(vec![
            CatalogEntry::Command(CommandDefinition::chat_input("ping", "Pong", silent())),
            CatalogEntry::category("fun", "Fun things", vec![sub("cheese"), sub("crazy")]),
        ]);

        assert_eq!(registry.len(), 2);
        let fun = registry.get(CommandKind::ChatInput, "fun").unwrap();
        assert!(fun.is_grouped());
        let names: Vec<_> = fun.subcommands.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["cheese", "crazy"]);
    }

    #[test]
    fn invalid_entries_are_skipped_not_fatal() {
        let registry = CommandRegistry::load(vec![
            CatalogEntry::Command(CommandDefinition::chat_input("", "no name", silent())),
            CatalogEntry::Command(CommandDefinition::chat_input("Has Caps", "bad", silent())),
            CatalogEntry::Command(CommandDefinition::chat_input("nodesc", "", silent())),
            CatalogEntry::Command(CommandDefinition::chat_input("ok", "fine", silent())),
        ]);
        assert_eq!(registry.len(), 1);
        assert!(registry.get(CommandKind::ChatInput, "ok").is_some());
    }

    #[test]
    fn duplicates_are_rejected_not_overwritten() {
        let mut registry = CommandRegistry::new();
        registry
            .register(CommandDefinition::chat_input("ping", "first", silent()))
            .unwrap();
        let err = registry
            .register(CommandDefinition::chat_input("ping", "second", silent()))
            .unwrap_err();
        assert_eq!(err, RegistryError::Duplicate("ping".into()));
        assert_eq!(registry.get(CommandKind::ChatInput, "ping").unwrap().description, "first");
    }

    #[test]
    fn context_menus_share_names_across_kinds() {
        let registry = CommandRegistry::load(vec![
            CatalogEntry::Command(CommandDefinition::context_menu(CommandKind::User, "Cheese", silent())),
            CatalogEntry::Command(CommandDefinition::context_menu(CommandKind::Message, "Cheese", silent())),
        ]);
        assert_eq!(registry.len(), 2);
        assert!(registry.get(CommandKind::ChatInput, "Cheese").is_none());
    }

    #[test]
    fn empty_categories_are_dropped() {
        let registry = CommandRegistry::load(vec![CatalogEntry::category(
            "broken",
            "nothing loads",
            vec![sub(""), sub("BAD")],
        )]);
        assert!(registry.is_empty());
    }

    #[test]
    fn duplicate_subcommands_keep_the_first() {
        let registry = CommandRegistry::load(vec![CatalogEntry::category(
            "utils",
            "Utility",
            vec![sub("ping"), sub("ping"), sub("help")],
        )]);
        let utils = registry.get(CommandKind::ChatInput, "utils").unwrap();
        assert_eq!(utils.subcommands.len(), 2);
    }

    #[test]
    fn name_rules() {
        assert!(validate_name(CommandKind::ChatInput, "user-check_2").is_ok());
        assert_eq!(validate_name(CommandKind::ChatInput, "  "), Err(RegistryError::EmptyName));
        assert!(validate_name(CommandKind::ChatInput, &"x".repeat(33)).is_err());
        assert!(validate_name(CommandKind::User, "Dev Badge").is_ok());
    }
}
