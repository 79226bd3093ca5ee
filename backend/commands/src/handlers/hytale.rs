use anyhow::Result;
use async_trait::async_trait;
use clove_core::{Embed, Interaction, Reply, Responder, colors};
use clove_hytale::{Availability, UsernameStatus};
use tracing::warn;

use crate::dispatch::{CommandContext, CommandHandler};

fn status_embed(username: &str, status: &UsernameStatus) -> Embed {
    let embed = match &status.availability {
        Availability::Available => Embed::new()
            .color(colors::GREEN)
            .title("✅ Username Available")
            .description(format!("**{username}** is available to claim.")),
        Availability::Taken => Embed::new()
            .color(colors::RED)
            .title("❌ Username Taken")
            .description(format!("**{username}** is already taken.")),
        Availability::Reserved => Embed::new()
            .color(colors::YELLOW)
            .title("⚠️ Username Reserved")
            .description(format!("**{username}** is reserved and cannot be claimed.")),
        Availability::Unknown(raw) => Embed::new()
            .color(colors::GRAY)
            .title("❓ Unknown Status")
            .description(format!("Received unexpected status: `{raw}`")),
    };
    embed
        .footer(if status.cached { "Result from cache" } else { "Live result" })
        .timestamp()
}

pub struct UsercheckHandler;

#[async_trait]
impl CommandHandler for UsercheckHandler {
    async fn execute(&self, ctx: &CommandContext, interaction: &Interaction, responder: &Responder) -> Result<()> {
        responder.defer(true).await?;
        let username = interaction
            .string("username")
            .ok_or_else(|| anyhow::anyhow!("missing required option `username`"))?;

        match ctx.usernames.check(username).await {
            Ok(status) => responder.edit(Reply::embed(status_embed(username, &status))).await,
            Err(e) => {
                warn!(username = %username, error = %e, "Username check failed");
                responder
                    .edit(Reply::text("⚠️ Failed to check username. Please try again later."))
                    .await
            }
        }
    }
}
