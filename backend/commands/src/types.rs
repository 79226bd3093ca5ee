/// Command schema types.
///
/// These describe the command surface that gets deployed to the platform;
/// handlers live next to them in the registry.
use clove_core::InteractionKind;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Kind
// ---------------------------------------------------------------------------

/// How a command is invoked on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    /// Typed `/name` command.
    ChatInput,
    /// Right-click on a user.
    User,
    /// Right-click on a message.
    Message,
}

impl CommandKind {
    /// The command kind an interaction invokes, if it invokes one at all.
    pub fn from_interaction(kind: InteractionKind) -> Option<Self> {
        match kind {
            InteractionKind::ChatInput => Some(Self::ChatInput),
            InteractionKind::UserContext => Some(Self::User),
            InteractionKind::MessageContext => Some(Self::Message),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ChatInput => "slash",
            Self::User => "user",
            Self::Message => "message",
        }
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    String,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSchema {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: OptionKind,
    pub required: bool,
    /// Values are suggested live while the user types.
    pub autocomplete: bool,
}

impl OptionSchema {
    fn new(kind: OptionKind, name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            kind,
            required: false,
            autocomplete: false,
        }
    }

    pub fn string(name: &str, description: &str) -> Self {
        Self::new(OptionKind::String, name, description)
    }

    pub fn user(name: &str, description: &str) -> Self {
        Self::new(OptionKind::User, name, description)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn autocomplete(mut self) -> Self {
        self.autocomplete = true;
        self
    }
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubcommandSchema {
    pub name: String,
    pub description: String,
    pub options: Vec<OptionSchema>,
}

impl SubcommandSchema {
    pub fn new(name: &str, description: &str) -> Self {
        Self { name: name.to_string(), description: description.to_string(), options: Vec::new() }
    }

    pub fn option(mut self, option: OptionSchema) -> Self {
        self.options.push(option);
        self
    }
}
