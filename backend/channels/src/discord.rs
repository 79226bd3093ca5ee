use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use clove_commands::InteractionDispatcher;
use clove_core::{Caller, FocusedOption, InteractionKind, InteractionOption, OptionValue, Responder};
use serenity::all::{
    CommandDataOption, CommandDataOptionValue, CommandInteraction, CommandType, Interaction,
    InteractionId, ResolvedTarget, ShardManager,
};
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use tracing::{debug, error, info};

use crate::ChannelAdapter;
use crate::transport::SerenityTransport;

/// A platform interaction converted into the core model, plus what is needed
/// to answer it.
#[derive(Debug)]
pub struct Inbound {
    pub interaction: clove_core::Interaction,
    pub id: InteractionId,
    pub token: String,
}

fn option_value(value: &CommandDataOptionValue) -> OptionValue {
    match value {
        CommandDataOptionValue::String(s) => OptionValue::String(s.clone()),
        CommandDataOptionValue::Integer(n) => OptionValue::Integer(*n),
        CommandDataOptionValue::Boolean(b) => OptionValue::Boolean(*b),
        CommandDataOptionValue::User(id) => OptionValue::User(id.to_string()),
        CommandDataOptionValue::Autocomplete { value, .. } => OptionValue::String(value.clone()),
        _ => OptionValue::Other,
    }
}

/// Split top-level options into the invoked subcommand (if any) and the
/// options that apply to it.
pub fn flatten_options(options: &[CommandDataOption]) -> (Option<String>, Vec<InteractionOption>) {
    let mut subcommand = None;
    let mut flat = Vec::new();
    for option in options {
        match &option.value {
            CommandDataOptionValue::SubCommand(inner) => {
                subcommand = Some(option.name.clone());
                flat.extend(inner.iter().map(|o| InteractionOption {
                    name: o.name.clone(),
                    value: option_value(&o.value),
                }));
            }
            value => flat.push(InteractionOption { name: option.name.clone(), value: option_value(value) }),
        }
    }
    (subcommand, flat)
}

fn command_interaction(cmd: &CommandInteraction, autocomplete: bool) -> Option<clove_core::Interaction> {
    let kind = if autocomplete {
        InteractionKind::Autocomplete
    } else {
        match cmd.data.kind {
            CommandType::ChatInput => InteractionKind::ChatInput,
            CommandType::User => InteractionKind::UserContext,
            CommandType::Message => InteractionKind::MessageContext,
            _ => return None,
        }
    };

    let caller = Caller::new(cmd.user.id.to_string(), cmd.user.tag());
    let mut interaction = clove_core::Interaction::new(kind, caller, cmd.data.name.clone());
    interaction.id = cmd.id.to_string();

    let (subcommand, options) = flatten_options(&cmd.data.options);
    interaction.subcommand = subcommand;
    interaction.options = options;

    if autocomplete {
        interaction.focused = cmd.data.autocomplete().map(|focused| FocusedOption {
            name: focused.name.to_string(),
            value: focused.value.to_string(),
        });
    }

    interaction.target_user = match cmd.data.target() {
        Some(ResolvedTarget::User(user, _)) => Some(user.id.to_string()),
        Some(ResolvedTarget::Message(message)) => Some(message.author.id.to_string()),
        _ => None,
    };
    Some(interaction)
}

/// `None` for interaction types the bot never answers (pings, modals).
pub fn convert_interaction(interaction: &Interaction) -> Option<Inbound> {
    match interaction {
        Interaction::Command(cmd) => Some(Inbound {
            interaction: command_interaction(cmd, false)?,
            id: cmd.id,
            token: cmd.token.clone(),
        }),
        Interaction::Autocomplete(cmd) => Some(Inbound {
            interaction: command_interaction(cmd, true)?,
            id: cmd.id,
            token: cmd.token.clone(),
        }),
        Interaction::Component(component) => {
            let caller = Caller::new(component.user.id.to_string(), component.user.tag());
            let mut converted =
                clove_core::Interaction::new(InteractionKind::Component, caller, String::new());
            converted.id = component.id.to_string();
            Some(Inbound { interaction: converted, id: component.id, token: component.token.clone() })
        }
        _ => None,
    }
}

struct Handler {
    dispatcher: Arc<InteractionDispatcher>,
    shards: Arc<OnceLock<Arc<ShardManager>>>,
}

impl Handler {
    async fn gateway_latency(&self, ctx: &Context) -> Option<Duration> {
        let manager = self.shards.get()?;
        let runners = manager.runners.lock().await;
        runners.get(&ctx.shard_id).and_then(|runner| runner.latency)
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Some(inbound) = convert_interaction(&interaction) else {
            debug!(kind = ?interaction.kind(), "Ignoring interaction");
            return;
        };

        let mut converted = inbound.interaction;
        converted.gateway_latency = self.gateway_latency(&ctx).await;

        let responder = Responder::new(Arc::new(SerenityTransport::new(ctx, inbound.id, inbound.token)));
        let outcome = self.dispatcher.dispatch(&converted, &responder).await;
        debug!(command = %converted.qualified_name(), ?outcome, "Interaction handled");
    }

    async fn ready(&self, _: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);
    }
}

pub struct DiscordAdapter {
    token: String,
}

impl DiscordAdapter {
    pub fn new(token: String) -> Self {
        Self { token }
    }
}

#[async_trait]
impl ChannelAdapter for DiscordAdapter {
    fn name(&self) -> &str {
        "discord"
    }

    async fn start(&self, dispatcher: Arc<InteractionDispatcher>) -> anyhow::Result<()> {
        info!(commands = dispatcher.registry().len(), "Starting Discord adapter");

        let shards = Arc::new(OnceLock::new());
        let mut client = Client::builder(&self.token, GatewayIntents::GUILDS)
            .event_handler(Handler { dispatcher, shards: shards.clone() })
            .await?;
        let _ = shards.set(client.shard_manager.clone());

        if let Err(why) = client.start().await {
            error!("Client error: {:?}", why);
            anyhow::bail!("Discord client error: {:?}", why);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options(raw: serde_json::Value) -> Vec<CommandDataOption> {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn subcommand_options_are_flattened() {
        let raw = options(json!([{
            "name": "add",
            "type": 1,
            "options": [{"name": "member", "type": 3, "value": "alice"}]
        }]));
        let (sub, flat) = flatten_options(&raw);

        assert_eq!(sub.as_deref(), Some("add"));
        assert_eq!(
            flat,
            vec![InteractionOption { name: "member".into(), value: OptionValue::String("alice".into()) }]
        );
    }

    #[test]
    fn top_level_user_option() {
        let raw = options(json!([{"name": "user", "type": 6, "value": "652597508027187240"}]));
        let (sub, flat) = flatten_options(&raw);

        assert_eq!(sub, None);
        assert_eq!(flat[0].value, OptionValue::User("652597508027187240".into()));
    }
}
