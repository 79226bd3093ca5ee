//! `clove-commands`: command registry, category routing, interaction
//! dispatch, autocomplete and the built-in handlers.

pub mod autocomplete;
pub mod catalog;
pub mod collector;
pub mod dispatch;
pub mod handlers;
pub mod help;
pub mod members;
pub mod registry;
pub mod router;
pub mod types;

#[cfg(test)]
mod testing;

pub use autocomplete::AutocompleteResolver;
pub use catalog::builtin_catalog;
pub use dispatch::{
    BotSettings, CommandContext, CommandHandler, DispatchOutcome, InteractionDispatcher,
    GENERIC_FAILURE,
};
pub use help::HelpIndex;
pub use registry::{CatalogEntry, CommandDefinition, CommandRegistry, RegistryError};
pub use router::{CategoryRouter, Subcommand};
pub use types::{CommandKind, OptionKind, OptionSchema, SubcommandSchema};
