//! `clove-channels`: the Discord side of the bot. Gateway adapter, response
//! transport, command-surface deployment and DM notifications.

use std::sync::Arc;

use async_trait::async_trait;
use clove_commands::InteractionDispatcher;

pub mod deploy;
pub mod discord;
pub mod discord_embeds;
pub mod discord_slash;
pub mod transport;

pub use deploy::{DeployReport, deploy};
pub use discord::DiscordAdapter;
pub use discord_slash::build_commands;
pub use transport::{DiscordNotifier, SerenityTransport, snowflake};

/// All channel adapters implement this trait.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// Human-readable adapter name for logging.
    fn name(&self) -> &str;

    /// Connect and feed every inbound interaction to `dispatcher` until the
    /// connection closes.
    async fn start(&self, dispatcher: Arc<InteractionDispatcher>) -> anyhow::Result<()>;
}
