use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use clove_core::{
    ActionRow, ComponentEvent, Embed, Interaction, Reply, Responder, SelectMenu, SelectOption,
    colors,
};
use tracing::warn;

use crate::collector::{self, ComponentFlow, Flow};
use crate::dispatch::{CommandContext, CommandHandler};
use crate::help::{HelpCategory, HelpIndex};

// ---------------------------------------------------------------------------
// ping
// ---------------------------------------------------------------------------

pub struct PingHandler;

#[async_trait]
impl CommandHandler for PingHandler {
    async fn execute(&self, _ctx: &CommandContext, interaction: &Interaction, responder: &Responder) -> Result<()> {
        let start = Instant::now();
        responder.defer(true).await?;
        let roundtrip = start.elapsed().as_millis();

        let gateway = interaction
            .gateway_latency
            .map(|d| format!("{}ms", d.as_millis()))
            .unwrap_or_else(|| "n/a".to_string());

        responder
            .edit(Reply::text(format!(
                "🏓 Pong!\nRoundtrip latency: {roundtrip}ms\nWebSocket latency: {gateway}"
            )))
            .await
    }
}

// ---------------------------------------------------------------------------
// userid / invite
// ---------------------------------------------------------------------------

pub struct UserIdHandler;

#[async_trait]
impl CommandHandler for UserIdHandler {
    async fn execute(&self, _ctx: &CommandContext, interaction: &Interaction, responder: &Responder) -> Result<()> {
        let id = interaction.user("user").unwrap_or(&interaction.caller.id);
        responder.reply(Reply::text(id)).await
    }
}

pub struct InviteHandler;

#[async_trait]
impl CommandHandler for InviteHandler {
    async fn execute(&self, ctx: &CommandContext, _interaction: &Interaction, responder: &Responder) -> Result<()> {
        responder.reply(Reply::text(ctx.settings.invite_link.as_str())).await
    }
}

// ---------------------------------------------------------------------------
// help
// ---------------------------------------------------------------------------

pub const HELP_MENU_ID: &str = "help_category";
const HELP_TIMEOUT: Duration = Duration::from_secs(300);

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

fn overview_embed(index: &HelpIndex) -> Embed {
    let summary = index
        .categories
        .iter()
        .map(|c| {
            let n = c.entries.len();
            format!("{} **{}** - {} command{}", c.emoji, c.name, n, plural(n))
        })
        .collect::<Vec<_>>()
        .join("\n");

    Embed::new()
        .color(colors::BLURPLE)
        .title("📚 Bot Commands")
        .description("Select a category from the dropdown below to view commands in that category.")
        .field("Categories", if summary.is_empty() { "None".to_string() } else { summary }, false)
        .footer("Commands are organized by category!")
}

fn category_embed(category: &HelpCategory) -> Embed {
    let listing = category
        .entries
        .iter()
        .map(|e| format!("**{}**\n{}", e.usage, e.description))
        .collect::<Vec<_>>()
        .join("\n\n");

    Embed::new()
        .color(colors::BLURPLE)
        .title(format!("{} {} Commands", category.emoji, category.name))
        .description(listing)
        .footer("Use the dropdown to view other categories")
}

fn category_menu(index: &HelpIndex, disabled: bool) -> ActionRow {
    let mut options = vec![SelectOption {
        label: "Overview".to_string(),
        value: "overview".to_string(),
        description: Some("View all categories".to_string()),
        emoji: Some("📚".to_string()),
    }];
    options.extend(index.categories.iter().map(|c| SelectOption {
        label: c.name.clone(),
        value: c.id.clone(),
        description: Some(format!("View {} commands", c.name.to_lowercase())),
        emoji: Some(c.emoji.clone()),
    }));

    ActionRow::select(SelectMenu {
        custom_id: HELP_MENU_ID.to_string(),
        placeholder: Some("Select a category".to_string()),
        options,
        disabled,
    })
}

struct HelpFlow<'a> {
    index: &'a HelpIndex,
    responder: &'a Responder,
}

#[async_trait]
impl<'a> ComponentFlow for HelpFlow<'a> {
    fn foreign_notice(&self) -> &str {
        "This help menu is not for you! Use `/utils help` to get your own."
    }

    async fn on_event(&mut self, event: &ComponentEvent) -> Result<Flow> {
        if event.custom_id != HELP_MENU_ID {
            return Ok(Flow::Continue);
        }
        let embed = match event.values.first().map(String::as_str) {
            Some("overview") => overview_embed(self.index),
            Some(id) => match self.index.get(id) {
                Some(category) => category_embed(category),
                None => return Ok(Flow::Continue),
            },
            None => return Ok(Flow::Continue),
        };
        event
            .responder
            .update(Reply::embed(embed).with_components(vec![category_menu(self.index, false)]))
            .await?;
        Ok(Flow::Continue)
    }

    async fn finish(&mut self, _collected: usize) -> Result<()> {
        let disabled = Reply::default().with_components(vec![category_menu(self.index, true)]);
        // The message may be gone by now; nothing else to do then.
        if let Err(e) = self.responder.edit(disabled).await {
            warn!(error = %e, "Could not disable help menu");
        }
        Ok(())
    }
}

pub struct HelpHandler;

#[async_trait]
impl CommandHandler for HelpHandler {
    async fn execute(&self, ctx: &CommandContext, interaction: &Interaction, responder: &Responder) -> Result<()> {
        let reply = Reply::embed(overview_embed(&ctx.help))
            .with_components(vec![category_menu(&ctx.help, false)])
            .ephemeral();
        responder.reply(reply).await?;

        let mut flow = HelpFlow { index: &ctx.help, responder };
        collector::run(responder, &interaction.caller.id, &ctx.gate, HELP_TIMEOUT, &mut flow).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::help::HelpEntry;
    use crate::testing::{FRIEND, OWNER, TestContext, caller};
    use clove_core::mock::{RecordingTransport, Sent};
    use clove_core::{Component, OptionValue};
    use std::sync::Arc;

    fn index() -> HelpIndex {
        HelpIndex {
            categories: vec![HelpCategory {
                id: "fun".into(),
                name: "Fun".into(),
                emoji: "🎉".into(),
                entries: vec![HelpEntry { usage: "/fun cheese".into(), description: "Send the cheese GIF".into() }],
            }],
        }
    }

    async fn run(handler: &dyn CommandHandler, ctx: &CommandContext, i: Interaction) -> Vec<Sent> {
        let transport = Arc::new(RecordingTransport::new());
        handler.execute(ctx, &i, &Responder::new(transport.clone())).await.unwrap();
        transport.sent()
    }

    #[tokio::test]
    async fn userid_defaults_to_caller() {
        let ctx = TestContext::new().build();
        let own = run(&UserIdHandler, &ctx, Interaction::chat_input(caller(FRIEND), "utils")).await;
        assert_eq!(own, vec![Sent::Response(Reply::text(FRIEND))]);

        let other = Interaction::chat_input(caller(FRIEND), "utils").with_option("user", OptionValue::User("5".into()));
        assert_eq!(run(&UserIdHandler, &ctx, other).await, vec![Sent::Response(Reply::text("5"))]);
    }

    #[tokio::test]
    async fn ping_defers_privately_then_edits() {
        let ctx = TestContext::new().build();
        let mut i = Interaction::chat_input(caller(FRIEND), "utils");
        i.gateway_latency = Some(Duration::from_millis(42));

        let sent = run(&PingHandler, &ctx, i).await;

        assert_eq!(sent[0], Sent::Defer { ephemeral: true });
        let Sent::Edit(reply) = &sent[1] else { panic!("expected edit") };
        let text = reply.content.as_deref().unwrap();
        assert!(text.starts_with("🏓 Pong!"));
        assert!(text.contains("WebSocket latency: 42ms"));
    }

    #[tokio::test]
    async fn invite_uses_configured_link() {
        let ctx = TestContext::new().build();
        let sent = run(&InviteHandler, &ctx, Interaction::chat_input(caller(FRIEND), "utils")).await;
        assert_eq!(sent, vec![Sent::Response(Reply::text(crate::dispatch::DEFAULT_INVITE_LINK))]);
    }

    #[test]
    fn overview_counts_commands() {
        let embed = overview_embed(&index());
        assert_eq!(embed.fields[0].value, "🎉 **Fun** - 1 command");
    }

    #[tokio::test]
    async fn help_switches_category_then_disables_menu() {
        let ctx = TestContext::new().help(index()).build();
        let transport = Arc::new(RecordingTransport::new());
        let pick = transport.push_component(OWNER, HELP_MENU_ID, &["fun"]);
        let intruder = transport.push_component(FRIEND, HELP_MENU_ID, &["overview"]);
        let responder = Responder::new(transport.clone());

        HelpHandler
            .execute(&ctx, &Interaction::chat_input(caller(OWNER), "utils"), &responder)
            .await
            .unwrap();

        let Sent::Update(update) = &pick.sent()[0] else { panic!("expected update") };
        assert_eq!(update.embeds[0].title.as_deref(), Some("🎉 Fun Commands"));

        let Sent::Response(notice) = &intruder.sent()[0] else { panic!("expected notice") };
        assert!(notice.ephemeral);
        assert!(notice.content.as_deref().unwrap().contains("not for you"));

        let sent = transport.sent();
        let Sent::Response(first) = &sent[0] else { panic!("expected reply") };
        assert!(first.ephemeral);
        let Sent::Edit(last) = sent.last().unwrap() else { panic!("expected final edit") };
        let rows = last.components.as_ref().unwrap();
        let Component::SelectMenu(menu) = &rows[0].components[0] else { panic!("expected menu") };
        assert!(menu.disabled);
        assert_eq!(menu.options.len(), 2);
    }
}
