//! Front management: add, remove, health, lockout.
//!
//! All replies are private. Every switch sends the complete desired fronter
//! set, computed from a fresh fetch taken right before the call.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use clove_core::{
    ActionRow, Button, ButtonStyle, Caller, ComponentEvent, Embed, Interaction, Reply, Responder,
    colors,
};
use clove_front::{FrontApi, Member};
use tracing::{info, warn};

use crate::collector::{self, ComponentFlow, Flow};
use crate::dispatch::{CommandContext, CommandHandler};
use crate::members::{
    MAX_LISTED, MemberMatch, bullet_list, fronter_field, resolve_member, with_member,
    without_member,
};

fn error_embed(title: &str, description: impl Into<String>) -> Embed {
    Embed::new().color(colors::RED).title(title).description(description).timestamp()
}

fn member_query(interaction: &Interaction) -> Result<&str> {
    interaction
        .string("member")
        .ok_or_else(|| anyhow::anyhow!("missing required option `member`"))
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontChange {
    Added,
    Removed,
}

pub fn change_embed(change: FrontChange, member: &str, fronters: &[Member], by: &Caller) -> Embed {
    let (color, title, description) = match change {
        FrontChange::Added => (
            colors::GREEN,
            "✅ Member Added to Front",
            format!("**{member}** has been added to the front."),
        ),
        FrontChange::Removed => (
            colors::YELLOW,
            "➖ Member Removed from Front",
            format!("**{member}** has been removed from the front."),
        ),
    };
    Embed::new()
        .color(color)
        .title(title)
        .description(description)
        .field("Current Fronters", fronter_field(fronters), false)
        .footer(format!("Triggered by {}", by.tag))
        .timestamp()
}

/// DM every configured user except whoever made the change. Delivery failures
/// are logged and skipped.
pub async fn notify_front_change(
    ctx: &CommandContext,
    change: FrontChange,
    member: &str,
    fronters: &[Member],
    by: &Caller,
) {
    let reply = Reply::embed(change_embed(change, member, fronters, by));
    for user_id in ctx.settings.notify_user_ids.iter().filter(|id| **id != by.id) {
        match ctx.notifier.direct_message(user_id, &reply).await {
            Ok(()) => info!(user = %user_id, "Sent front change notification"),
            Err(e) => warn!(user = %user_id, error = %e, "Failed to send front change notification"),
        }
    }
}

// ---------------------------------------------------------------------------
// add
// ---------------------------------------------------------------------------

pub struct AddHandler;

impl AddHandler {
    async fn run(&self, ctx: &CommandContext, interaction: &Interaction, responder: &Responder) -> Result<()> {
        let query = member_query(interaction)?;
        let members = ctx.front.members().await?;
        if members.is_empty() {
            return responder.edit(Reply::text("❌ Could not fetch members from the system.")).await;
        }

        let member = match resolve_member(query, &members) {
            MemberMatch::Found(member) => member,
            MemberMatch::NotFound => {
                return responder.edit(Reply::text(format!("❌ No member found matching \"{query}\""))).await;
            }
            MemberMatch::Ambiguous(found) => {
                return responder
                    .edit(Reply::text(format!(
                        "❌ Multiple members found matching \"{query}\":\n{}\n\nPlease be more specific.",
                        bullet_list(found, MAX_LISTED)
                    )))
                    .await;
            }
        };

        let current = ctx.front.fronters().await?;
        if current.contains(&member.id) {
            let embed = Embed::new()
                .color(colors::YELLOW)
                .title("ℹ️ Already Fronting")
                .description(format!("**{}** is already in the front!", member.label()))
                .field("Current Fronters", fronter_field(&current.members), false)
                .timestamp();
            return responder.edit(Reply::embed(embed)).await;
        }

        let result = ctx.front.switch(&with_member(&current, &member.id)).await?;
        if !result.is_success() {
            let message = if result.message.is_empty() { "Unknown error occurred" } else { result.message.as_str() };
            return responder.edit(Reply::embed(error_embed("❌ Failed to Add Member", message))).await;
        }

        info!(member = %member.label(), caller = %interaction.caller.tag, "Member added to front");
        let embed = Embed::new()
            .color(colors::GREEN)
            .title("✅ Member Added to Front")
            .description(format!("**{}** has been added to the front!", member.label()))
            .field("Current Fronters", fronter_field(&result.fronters), false)
            .timestamp();
        responder.edit(Reply::embed(embed)).await?;

        notify_front_change(ctx, FrontChange::Added, member.label(), &result.fronters, &interaction.caller).await;
        Ok(())
    }
}

#[async_trait]
impl CommandHandler for AddHandler {
    async fn execute(&self, ctx: &CommandContext, interaction: &Interaction, responder: &Responder) -> Result<()> {
        responder.defer(true).await?;
        if let Err(e) = self.run(ctx, interaction, responder).await {
            warn!(error = %e, "dough add failed");
            let embed = error_embed("❌ Error", format!("Failed to add member: {e}"));
            responder.edit(Reply::embed(embed)).await?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// remove
// ---------------------------------------------------------------------------

pub struct RemoveHandler;

impl RemoveHandler {
    async fn run(&self, ctx: &CommandContext, interaction: &Interaction, responder: &Responder) -> Result<()> {
        let query = member_query(interaction)?;
        let fronting = ctx.front.fronters().await?.members;
        if fronting.is_empty() {
            return responder.edit(Reply::text("❌ No one is currently fronting!")).await;
        }

        let member = match resolve_member(query, &fronting) {
            MemberMatch::Found(member) => member,
            MemberMatch::NotFound => {
                let names: Vec<&str> = fronting.iter().map(Member::label).collect();
                return responder
                    .edit(Reply::text(format!(
                        "❌ No fronting member found matching \"{query}\"\n\nCurrently fronting: {}",
                        names.join(", ")
                    )))
                    .await;
            }
            MemberMatch::Ambiguous(found) => {
                return responder
                    .edit(Reply::text(format!(
                        "❌ Multiple fronting members found matching \"{query}\":\n{}\n\nPlease be more specific.",
                        bullet_list(found, MAX_LISTED)
                    )))
                    .await;
            }
        };

        // The front may have changed since the search.
        let current = ctx.front.fronters().await?;
        if !current.contains(&member.id) {
            let embed = Embed::new()
                .color(colors::YELLOW)
                .title("ℹ️ Not Fronting")
                .description(format!("**{}** is not currently fronting!", member.label()))
                .timestamp();
            return responder.edit(Reply::embed(embed)).await;
        }

        let result = ctx.front.switch(&without_member(&current, &member.id)).await?;
        if !result.is_success() {
            let message = if result.message.is_empty() { "Unknown error occurred" } else { result.message.as_str() };
            return responder.edit(Reply::embed(error_embed("❌ Failed to Remove Member", message))).await;
        }

        info!(member = %member.label(), caller = %interaction.caller.tag, "Member removed from front");
        let embed = Embed::new()
            .color(colors::GREEN)
            .title("✅ Member Removed from Front")
            .description(format!("**{}** has been removed from the front.", member.label()))
            .field("Current Fronters", fronter_field(&result.fronters), false)
            .timestamp();
        responder.edit(Reply::embed(embed)).await?;

        notify_front_change(ctx, FrontChange::Removed, member.label(), &result.fronters, &interaction.caller).await;
        Ok(())
    }
}

#[async_trait]
impl CommandHandler for RemoveHandler {
    async fn execute(&self, ctx: &CommandContext, interaction: &Interaction, responder: &Responder) -> Result<()> {
        responder.defer(true).await?;
        if let Err(e) = self.run(ctx, interaction, responder).await {
            warn!(error = %e, "dough remove failed");
            let embed = error_embed("❌ Error", format!("Failed to remove member: {e}"));
            responder.edit(Reply::embed(embed)).await?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// health
// ---------------------------------------------------------------------------

pub struct HealthHandler;

#[async_trait]
impl CommandHandler for HealthHandler {
    async fn execute(&self, ctx: &CommandContext, _interaction: &Interaction, responder: &Responder) -> Result<()> {
        responder.defer(true).await?;

        let embed = match ctx.front.health().await {
            Ok(health) => Embed::new()
                .color(if health.authenticated { colors::PURE_GREEN } else { colors::PURE_RED })
                .title("🔗 API Health Check")
                .field("Status", if health.is_online() { "✅ Online" } else { "❌ Offline" }, true)
                .field("Authenticated", if health.authenticated { "✅ Yes" } else { "❌ No" }, true)
                .timestamp(),
            Err(e) => {
                warn!(error = %e, "Front API health check failed");
                Embed::new()
                    .color(colors::PURE_RED)
                    .title("❌ API Health Check Failed")
                    .description(e.to_string())
                    .timestamp()
            }
        };
        responder.edit(Reply::embed(embed)).await
    }
}

// ---------------------------------------------------------------------------
// lockout
// ---------------------------------------------------------------------------

pub const LOCKOUT_CONFIRM: &str = "lockout_confirm";
pub const LOCKOUT_CANCEL: &str = "lockout_cancel";
const LOCKOUT_TIMEOUT: Duration = Duration::from_secs(30);

const LOCKOUT_WARNING: &str = "**⚠️ WARNING: This will immediately terminate the current bot token!**\n\n\
**What happens:**\n\
• Current bot token becomes invalid immediately\n\
• New token is generated\n\
• Bot will stop working until you update the token\n\
• You will receive the new token in this message\n\n\
**Use this only if:**\n\
• Token has been compromised/leaked\n\
• Unauthorized access detected\n\
• Emergency security lockout needed\n\n\
**Are you sure you want to proceed?**";

fn token_embed(new_token: &str) -> Embed {
    Embed::new()
        .color(colors::GREEN)
        .title("✅ Token Regenerated Successfully")
        .description(format!(
            "**🔒 Old token has been terminated immediately.**\n\n\
             **New Bot Token:**\n```\n{new_token}\n```\n\n\
             **⚠️ IMPORTANT - Update Immediately:**\n\n\
             **1. Update the bot configuration:**\n```yaml\nfront:\n  token: {new_token}\n```\n\
             or set `DOUGH_API_TOKEN={new_token}`\n\n\
             **2. Restart the bot:**\n```bash\nclove run\n```\n\n\
             **3. Delete this message after copying the token!**\n\n\
             ⚠️ The bot will stop working in a few seconds until you update the token."
        ))
        .footer("Save this token immediately!")
        .timestamp()
}

struct LockoutFlow<'a> {
    front: &'a dyn FrontApi,
    responder: &'a Responder,
}

impl<'a> LockoutFlow<'a> {
    async fn regenerate(&self) -> Result<()> {
        let outcome = match self.front.regenerate_token().await {
            Ok(rotation) if rotation.success => Ok(rotation.new_token),
            Ok(rotation) if rotation.message.is_empty() => Err("Unknown error occurred".to_string()),
            Ok(rotation) => Err(rotation.message),
            Err(e) => Err(e.to_string()),
        };

        let embed = match outcome {
            Ok(token) => {
                warn!("Front API token regenerated; the running bot must be reconfigured");
                token_embed(&token)
            }
            Err(reason) => {
                warn!(reason = %reason, "Token regeneration failed");
                error_embed(
                    "❌ Token Regeneration Failed",
                    format!(
                        "Failed to regenerate token: {reason}\n\n\
                         Current token remains active. Please try again or check backend logs."
                    ),
                )
            }
        };
        self.responder.edit(Reply::embed(embed).clear_components()).await
    }
}

#[async_trait]
impl<'a> ComponentFlow for LockoutFlow<'a> {
    fn foreign_notice(&self) -> &str {
        "This confirmation is not for you!"
    }

    async fn on_event(&mut self, event: &ComponentEvent) -> Result<Flow> {
        match event.custom_id.as_str() {
            LOCKOUT_CANCEL => {
                let embed = Embed::new()
                    .color(colors::BLURPLE)
                    .title("✅ Lockout Cancelled")
                    .description("Token regeneration has been cancelled. Current token remains active.")
                    .timestamp();
                event.responder.update(Reply::embed(embed).clear_components()).await?;
                Ok(Flow::Stop)
            }
            LOCKOUT_CONFIRM => {
                let embed = Embed::new()
                    .color(colors::YELLOW)
                    .title("🔄 Regenerating Token...")
                    .description("Please wait while the bot token is regenerated...")
                    .timestamp();
                event.responder.update(Reply::embed(embed).clear_components()).await?;
                self.regenerate().await?;
                Ok(Flow::Stop)
            }
            _ => Ok(Flow::Continue),
        }
    }

    async fn finish(&mut self, collected: usize) -> Result<()> {
        if collected > 0 {
            return Ok(());
        }
        let embed = Embed::new()
            .color(colors::YELLOW)
            .title("⏱️ Confirmation Timed Out")
            .description(
                "Token regeneration was not confirmed within 30 seconds.\n\n\
                 Current token remains active. Run the command again if needed.",
            )
            .timestamp();
        if let Err(e) = self.responder.edit(Reply::embed(embed).clear_components()).await {
            warn!(error = %e, "Could not mark lockout as timed out");
        }
        Ok(())
    }
}

pub struct LockoutHandler;

#[async_trait]
impl CommandHandler for LockoutHandler {
    async fn execute(&self, ctx: &CommandContext, interaction: &Interaction, responder: &Responder) -> Result<()> {
        responder.defer(true).await?;

        let warning = Embed::new()
            .color(colors::RED)
            .title("🚨 Emergency Token Lockout")
            .description(LOCKOUT_WARNING)
            .footer("This action cannot be undone. Choose carefully.")
            .timestamp();
        let buttons = ActionRow::buttons([
            Button::new(LOCKOUT_CANCEL, "Cancel", ButtonStyle::Secondary),
            Button::new(LOCKOUT_CONFIRM, "⚠️ Yes, Regenerate Token", ButtonStyle::Danger),
        ]);
        responder.edit(Reply::embed(warning).with_components(vec![buttons])).await?;

        info!(caller = %interaction.caller.tag, "Token lockout requested");
        let mut flow = LockoutFlow { front: ctx.front.as_ref(), responder };
        collector::run(responder, &interaction.caller.id, &ctx.gate, LOCKOUT_TIMEOUT, &mut flow).await?;
        Ok(())
    }
}
