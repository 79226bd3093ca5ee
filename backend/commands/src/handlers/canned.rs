//! Fixed-text replies, optionally aimed at a user.

use anyhow::Result;
use async_trait::async_trait;
use clove_core::{Interaction, Reply, Responder, mention};

use crate::dispatch::{CommandContext, CommandHandler};

pub const PK: &str = "<@466378653216014359> is a bot used by plural systems to proxy their messages as their system members!\nYou can find more on the bot [online](<https://pluralkit.me>)";
pub const PLURAL: &str = "<@1291501048493768784> is a bot used by plural systems to proxy their messages as their system members!\nYou can find more on the bot [online](<https://plural.gg>)";
pub const PLURALITY: &str = "Plurality (or multiplicity) is the existence of multiple self-aware entities inside one physical brain.\nYou can find some simple information [here](<https://morethanone.info>)\nand some more advanced info [here](<https://pluralpedia.org/w/Main_Page>)";
pub const USERPROXIES: &str = "You can setup a Userproxy using this guide <https://youtu.be/spRkTssPCqg>!";

pub const CHEESE_GIF: &str = "https://cdn.discordapp.com/attachments/1427240630798782514/1446510314018439271/image0.gif";
pub const POOF_GIF: &str = "https://tenor.com/view/im-out-we-out-peace-out-disappear-gif-15464202";
pub const STFU_GIF: &str = "https://tenor.com/view/badger-russianbadger-therussianbadger-russianbadger-your-honor-therussianbadger-your-honor-gif-17976630367246948183";
pub const SIDEEYE_GIF: &str = "https://tenor.com/view/cat-stare-catstare-cat-stare-sus-catglare-cat-glare-gif-14942558849944709546";
pub const CRAZY: &str = "Crazy?...\nI was crazy once...\nThey locked me in a room...\nA rubber room\nA rubber room of rats...\nAnd rats make me crazy...";
pub const GAYZY: &str = "Gay?...\nI was gay once...\nThey locked me in a room...\nA rubber room\nA rubber room of cats...\nAnd cats make me gay...";

pub const HYTALE: &str = "Hytale is an upcoming block-based sandbox adventure RPG, similar to Minecraft but with deeper RPG systems, custom content tools, and creator focus, developed by Hypixel Studios (from the popular Minecraft server) and recently brought back under their full control after a brief cancellation by Riot Games. It features a procedurally generated world (Orbis) for exploration, combat, building, minigames, and extensive modding, with an early access launch planned for Windows on January 13, 2026.";

pub const REFRESH: &str = "To refresh your client to fix bugs or reload commands, use:\nControl + R on Windows and Linux\nCommand(⌘) + R on Mac\nSwipe clear and reopen on Mobile";
pub const ADB: &str = "Starting December 5, 2025, the active developer badge has been **removed**, and is **no longer** obtainable. There are also *no* plans for a new badge replacing this.";

/// How the target user is worked into the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Greeting {
    /// `Hey there, @user! message`
    HeyThere,
    /// `Hey there @user! message`
    HeyThereNoComma,
    /// `You know what @user...` then the message on its own lines.
    YouKnowWhat,
    /// `@user[.](link)`: a mention with the link preview hidden behind a dot.
    HiddenLink,
    /// `Hey there @user, here is more on Hytale` then the message.
    HytaleIntro,
}

impl Greeting {
    pub fn render(self, user: &str, message: &str) -> String {
        match self {
            Self::HeyThere => format!("Hey there, {user}! {message}"),
            Self::HeyThereNoComma => format!("Hey there {user}! {message}"),
            Self::YouKnowWhat => format!("You know what {user}...\n{message}"),
            Self::HiddenLink => format!("{user}[.]({message})"),
            Self::HytaleIntro => format!("Hey there {user}, here is more on Hytale\n{message}"),
        }
    }
}

/// Public reply with a fixed message. The target is the `user` option, or the
/// targeted user / message author for context menus.
pub struct CannedReply {
    pub message: &'static str,
    pub greeting: Greeting,
}

impl CannedReply {
    pub const fn new(message: &'static str, greeting: Greeting) -> Self {
        Self { message, greeting }
    }

    pub fn render(&self, interaction: &Interaction) -> String {
        let target = interaction.user("user").or(interaction.target_user.as_deref());
        match target {
            Some(user_id) => self.greeting.render(&mention(user_id), self.message),
            None => self.message.to_string(),
        }
    }
}

#[async_trait]
impl CommandHandler for CannedReply {
    async fn execute(
        &self,
        _ctx: &CommandContext,
        interaction: &Interaction,
        responder: &Responder,
    ) -> Result<()> {
        responder.reply(Reply::text(self.render(interaction))).await
    }
}
