/// Platform-neutral view of one inbound interaction.
///
/// The gateway adapter converts whatever the chat platform delivers into this
/// shape; everything past the adapter only ever sees an `Interaction`.
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Kind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    /// A typed `/command` invocation.
    ChatInput,
    /// Right-click on a user → Apps.
    UserContext,
    /// Right-click on a message → Apps.
    MessageContext,
    /// Live suggestion query while a parameter is being typed.
    Autocomplete,
    /// Button or select-menu click on a message the bot sent.
    Component,
    /// Anything the bot does not model (pings, modals, ...).
    Other,
}

impl InteractionKind {
    /// Kinds that carry a command name and can be routed to a handler.
    pub fn is_command(self) -> bool {
        matches!(self, Self::ChatInput | Self::UserContext | Self::MessageContext)
    }
}

// ---------------------------------------------------------------------------
// Caller
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    /// Opaque platform user id.
    pub id: String,
    /// Human-readable handle, used in logs and notification footers.
    pub tag: String,
}

impl Caller {
    pub fn new(id: impl Into<String>, tag: impl Into<String>) -> Self {
        Self { id: id.into(), tag: tag.into() }
    }

    /// Platform mention markup for this caller.
    pub fn mention(&self) -> String {
        mention(&self.id)
    }
}

/// `<@id>` mention markup for a user id.
pub fn mention(user_id: &str) -> String {
    format!("<@{user_id}>")
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum OptionValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    /// A user option, resolved to the user's id.
    User(String),
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionOption {
    pub name: String,
    pub value: OptionValue,
}

/// The option the user is typing into during an autocomplete query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusedOption {
    pub name: String,
    pub value: String,
}

// ---------------------------------------------------------------------------
// Interaction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Interaction {
    pub id: String,
    pub kind: InteractionKind,
    pub caller: Caller,
    /// Top-level command name; empty for component clicks.
    pub command_name: String,
    pub subcommand: Option<String>,
    /// Options of the invoked (sub)command, flattened.
    pub options: Vec<InteractionOption>,
    pub focused: Option<FocusedOption>,
    /// Context menus: the targeted user, or the author of the targeted message.
    pub target_user: Option<String>,
    pub gateway_latency: Option<Duration>,
}

impl Interaction {
    pub fn new(kind: InteractionKind, caller: Caller, command_name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            kind,
            caller,
            command_name: command_name.into(),
            subcommand: None,
            options: Vec::new(),
            focused: None,
            target_user: None,
            gateway_latency: None,
        }
    }

    pub fn chat_input(caller: Caller, command_name: impl Into<String>) -> Self {
        Self::new(InteractionKind::ChatInput, caller, command_name)
    }

    pub fn autocomplete(
        caller: Caller,
        command_name: impl Into<String>,
        focused_name: impl Into<String>,
        focused_value: impl Into<String>,
    ) -> Self {
        let mut interaction = Self::new(InteractionKind::Autocomplete, caller, command_name);
        interaction.focused = Some(FocusedOption {
            name: focused_name.into(),
            value: focused_value.into(),
        });
        interaction
    }

    pub fn with_subcommand(mut self, name: impl Into<String>) -> Self {
        self.subcommand = Some(name.into());
        self
    }

    pub fn with_option(mut self, name: impl Into<String>, value: OptionValue) -> Self {
        self.options.push(InteractionOption { name: name.into(), value });
        self
    }

    pub fn with_target_user(mut self, user_id: impl Into<String>) -> Self {
        self.target_user = Some(user_id.into());
        self
    }

    /// `"category subcommand"` for grouped commands, the bare name otherwise.
    pub fn qualified_name(&self) -> String {
        match &self.subcommand {
            Some(sub) => format!("{} {}", self.command_name, sub),
            None => self.command_name.clone(),
        }
    }

    fn option(&self, name: &str) -> Option<&OptionValue> {
        self.options.iter().find(|o| o.name == name).map(|o| &o.value)
    }

    /// Value of a string option.
    pub fn string(&self, name: &str) -> Option<&str> {
        match self.option(name)? {
            OptionValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// User id of a user option.
    pub fn user(&self, name: &str) -> Option<&str> {
        match self.option(name)? {
            OptionValue::User(id) => Some(id.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller() -> Caller {
        Caller::new("42", "someone")
    }

    #[test]
    fn qualified_name_joins_subcommand() {
        let i = Interaction::chat_input(caller(), "dough").with_subcommand("add");
        assert_eq!(i.qualified_name(), "dough add");
        let plain = Interaction::chat_input(caller(), "ping");
        assert_eq!(plain.qualified_name(), "ping");
    }

    #[test]
    fn typed_option_accessors() {
        let i = Interaction::chat_input(caller(), "fun")
            .with_option("member", OptionValue::String("Alice".into()))
            .with_option("user", OptionValue::User("7".into()));
        assert_eq!(i.string("member"), Some("Alice"));
        assert_eq!(i.user("user"), Some("7"));
        // Wrong type or missing name yields nothing.
        assert_eq!(i.string("user"), None);
        assert_eq!(i.user("missing"), None);
    }

    #[test]
    fn only_command_kinds_are_routable() {
        assert!(InteractionKind::ChatInput.is_command());
        assert!(InteractionKind::MessageContext.is_command());
        assert!(!InteractionKind::Autocomplete.is_command());
        assert!(!InteractionKind::Component.is_command());
    }
}
