use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::reply::{AutocompleteChoice, Reply};
use crate::responder::Responder;

/// Low-level response channel bound to a single interaction.
///
/// Implementations perform exactly the platform call named; choosing between
/// them (reply vs follow-up) is the job of [`Responder`].
#[async_trait]
pub trait InteractionTransport: Send + Sync {
    /// Primary reply. The platform accepts this at most once per interaction.
    async fn create_response(&self, reply: &Reply) -> Result<()>;

    /// Acknowledge now, answer later through `edit_response`.
    async fn defer(&self, ephemeral: bool) -> Result<()>;

    /// Replace the content of the primary reply.
    async fn edit_response(&self, reply: &Reply) -> Result<()>;

    /// Additional message after the primary reply has been used.
    async fn create_followup(&self, reply: &Reply) -> Result<()>;

    /// Component interactions only: rewrite the message the component lives on.
    async fn update_message(&self, reply: &Reply) -> Result<()>;

    /// Answer an autocomplete query.
    async fn autocomplete(&self, choices: &[AutocompleteChoice]) -> Result<()>;

    /// Component clicks on this interaction's reply message, for at most `timeout`.
    async fn component_events(&self, timeout: Duration) -> Result<ComponentStream>;
}

/// A button or select-menu click, carrying its own responder.
pub struct ComponentEvent {
    pub user_id: String,
    pub custom_id: String,
    pub values: Vec<String>,
    pub responder: Responder,
}

impl std::fmt::Debug for ComponentEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentEvent")
            .field("user_id", &self.user_id)
            .field("custom_id", &self.custom_id)
            .field("values", &self.values)
            .finish()
    }
}

pub type ComponentStream = BoxStream<'static, ComponentEvent>;

/// Out-of-band direct messages (front change notifications).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn direct_message(&self, user_id: &str, reply: &Reply) -> Result<()>;
}
