/// Autocomplete for member parameters.
///
/// Suggestions come straight from the remote API on every keystroke. Any
/// failure answers with an empty list; a half-typed command never shows an
/// error.
use std::sync::Arc;

use clove_core::{AutocompleteChoice, Interaction};
use clove_front::{FrontApi, Member};
use tracing::{debug, warn};

/// Platform cap on suggestions per response.
pub const MAX_CHOICES: usize = 25;

/// Which remote collection feeds a (command, subcommand, option) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Members,
    Fronters,
}

fn source_for(command: &str, subcommand: Option<&str>, option: &str) -> Option<Source> {
    match (command, subcommand, option) {
        ("dough", Some("add"), "member") => Some(Source::Members),
        ("dough", Some("remove"), "member") => Some(Source::Fronters),
        _ => None,
    }
}

/// Case-insensitive substring filter over label and name, order kept, capped.
pub fn filter_candidates(query: &str, candidates: &[Member]) -> Vec<AutocompleteChoice> {
    let query = query.to_lowercase();
    candidates
        .iter()
        .filter(|m| {
            m.label().to_lowercase().contains(&query) || m.name.to_lowercase().contains(&query)
        })
        .take(MAX_CHOICES)
        .map(|m| AutocompleteChoice::same(m.label()))
        .collect()
}

pub struct AutocompleteResolver {
    front: Arc<dyn FrontApi>,
}

impl AutocompleteResolver {
    pub fn new(front: Arc<dyn FrontApi>) -> Self {
        Self { front }
    }

    pub async fn resolve(&self, interaction: &Interaction) -> Vec<AutocompleteChoice> {
        let Some(focused) = &interaction.focused else {
            return Vec::new();
        };
        let Some(source) = source_for(
            &interaction.command_name,
            interaction.subcommand.as_deref(),
            &focused.name,
        ) else {
            debug!(command = %interaction.qualified_name(), option = %focused.name, "No autocomplete source");
            return Vec::new();
        };

        let candidates = match source {
            Source::Members => self.front.members().await,
            Source::Fronters => self.front.fronters().await.map(|f| f.members),
        };

        match candidates {
            Ok(members) => filter_candidates(&focused.value, &members),
            Err(e) => {
                warn!(command = %interaction.qualified_name(), error = %e, "Autocomplete fetch failed");
                Vec::new()
            }
        }
    }
}
