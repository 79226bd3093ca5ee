pub mod error;
pub mod interaction;
pub mod mock;
pub mod reply;
pub mod responder;
pub mod traits;

pub use error::CloveError;
pub use interaction::{mention, Caller, FocusedOption, Interaction, InteractionKind, InteractionOption, OptionValue};
pub use reply::{colors, ActionRow, AutocompleteChoice, Button, ButtonStyle, Component, Embed, EmbedField, Reply, SelectMenu, SelectOption};
pub use responder::{ResponseState, Responder};
pub use traits::{ComponentEvent, ComponentStream, InteractionTransport, Notifier};
