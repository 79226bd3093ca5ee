//! Interaction transport and direct-message notifier over serenity's HTTP client.

use std::num::NonZeroU64;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use clove_core::{
    AutocompleteChoice, ComponentEvent, ComponentStream, InteractionTransport, Notifier, Reply,
    Responder,
};
use futures::StreamExt;
use serenity::all::{
    ComponentInteraction, ComponentInteractionCollector, ComponentInteractionDataKind, Context,
    CreateAutocompleteResponse, CreateInteractionResponse, CreateInteractionResponseMessage, Http,
    InteractionId, UserId,
};
use tracing::debug;

use crate::discord_embeds;

/// Parse a Discord snowflake. Zero is not a valid id.
pub fn snowflake(raw: &str) -> Result<NonZeroU64> {
    let id: u64 = raw.trim().parse().with_context(|| format!("`{raw}` is not a Discord id"))?;
    NonZeroU64::new(id).with_context(|| format!("`{raw}` is not a Discord id"))
}

/// Response channel for one interaction, identified by its id and token.
pub struct SerenityTransport {
    ctx: Context,
    interaction_id: InteractionId,
    token: String,
}

impl SerenityTransport {
    pub fn new(ctx: Context, interaction_id: InteractionId, token: String) -> Self {
        Self { ctx, interaction_id, token }
    }

    async fn respond(&self, response: CreateInteractionResponse) -> Result<()> {
        self.ctx
            .http
            .create_interaction_response(self.interaction_id, &self.token, &response, Vec::new())
            .await?;
        Ok(())
    }
}

fn component_event(ctx: &Context, component: ComponentInteraction) -> ComponentEvent {
    let values = match &component.data.kind {
        ComponentInteractionDataKind::StringSelect { values } => values.clone(),
        _ => Vec::new(),
    };
    let user_id = component.user.id.to_string();
    let custom_id = component.data.custom_id.clone();
    let transport = SerenityTransport::new(ctx.clone(), component.id, component.token);
    ComponentEvent { user_id, custom_id, values, responder: Responder::new(Arc::new(transport)) }
}

#[async_trait]
impl InteractionTransport for SerenityTransport {
    async fn create_response(&self, reply: &Reply) -> Result<()> {
        self.respond(CreateInteractionResponse::Message(discord_embeds::response_message(reply)))
            .await
    }

    async fn defer(&self, ephemeral: bool) -> Result<()> {
        let msg = CreateInteractionResponseMessage::new().ephemeral(ephemeral);
        self.respond(CreateInteractionResponse::Defer(msg)).await
    }

    async fn edit_response(&self, reply: &Reply) -> Result<()> {
        self.ctx
            .http
            .edit_original_interaction_response(&self.token, &discord_embeds::edit_response(reply), Vec::new())
            .await?;
        Ok(())
    }

    async fn create_followup(&self, reply: &Reply) -> Result<()> {
        self.ctx
            .http
            .create_followup_message(&self.token, &discord_embeds::followup(reply), Vec::new())
            .await?;
        Ok(())
    }

    async fn update_message(&self, reply: &Reply) -> Result<()> {
        self.respond(CreateInteractionResponse::UpdateMessage(discord_embeds::response_message(reply)))
            .await
    }

    async fn autocomplete(&self, choices: &[AutocompleteChoice]) -> Result<()> {
        let response = choices.iter().fold(CreateAutocompleteResponse::new(), |r, c| {
            r.add_string_choice(&c.name, &c.value)
        });
        self.respond(CreateInteractionResponse::Autocomplete(response)).await
    }

    async fn component_events(&self, timeout: Duration) -> Result<ComponentStream> {
        let message = self
            .ctx
            .http
            .get_original_interaction_response(&self.token)
            .await
            .context("Failed to look up the interaction reply")?;
        debug!(message = %message.id, ?timeout, "Collecting component clicks");

        let ctx = self.ctx.clone();
        let stream = ComponentInteractionCollector::new(&self.ctx)
            .message_id(message.id)
            .timeout(timeout)
            .stream()
            .map(move |component| component_event(&ctx, component));
        Ok(stream.boxed())
    }
}

/// Sends front-change notices as DMs.
pub struct DiscordNotifier {
    http: Arc<Http>,
}

impl DiscordNotifier {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn direct_message(&self, user_id: &str, reply: &Reply) -> Result<()> {
        let user = UserId::from(snowflake(user_id)?);
        user.direct_message(&self.http, discord_embeds::direct_message(reply))
            .await
            .with_context(|| format!("Failed to DM user {user_id}"))?;
        Ok(())
    }
}
