//! Category listing shown by the help menu, derived from the registry.

use crate::registry::CommandRegistry;
use crate::types::CommandKind;

/// Display name and emoji for known categories, in menu order.
const KNOWN: &[(&str, &str, &str)] = &[
    ("dough", "Doughmination", "🍩"),
    ("plural", "Plurality", "🌟"),
    ("utils", "Utility", "🔧"),
    ("fun", "Fun", "🎉"),
    ("hytale", "Hytale", "🎮"),
    ("cat", "Cat", "🐱"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpEntry {
    /// Invocation as typed, e.g. `/dough add`.
    pub usage: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpCategory {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub entries: Vec<HelpEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HelpIndex {
    pub categories: Vec<HelpCategory>,
}

impl HelpIndex {
    pub fn from_registry(registry: &CommandRegistry) -> Self {
        let mut categories: Vec<HelpCategory> = registry
            .all()
            .filter(|def| def.kind == CommandKind::ChatInput && def.is_grouped())
            .map(|def| {
                let (name, emoji) = KNOWN
                    .iter()
                    .find(|(id, _, _)| *id == def.name)
                    .map(|(_, name, emoji)| (name.to_string(), emoji.to_string()))
                    .unwrap_or_else(|| (capitalize(&def.name), "📁".to_string()));
                HelpCategory {
                    id: def.name.clone(),
                    name,
                    emoji,
                    entries: def
                        .subcommands
                        .iter()
                        .map(|sub| HelpEntry {
                            usage: format!("/{} {}", def.name, sub.name),
                            description: sub.description.clone(),
                        })
                        .collect(),
                }
            })
            .collect();

        let rank = |id: &str| KNOWN.iter().position(|(k, _, _)| *k == id).unwrap_or(KNOWN.len());
        categories.sort_by(|a, b| rank(&a.id).cmp(&rank(&b.id)).then_with(|| a.id.cmp(&b.id)));
        Self { categories }
    }

    pub fn get(&self, id: &str) -> Option<&HelpCategory> {
        self.categories.iter().find(|c| c.id == id)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
