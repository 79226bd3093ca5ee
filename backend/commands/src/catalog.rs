//! Built-in command catalogue.

use std::sync::Arc;

use crate::handlers::canned::{self, CannedReply, Greeting};
use crate::handlers::{
    AddHandler, HealthHandler, HelpHandler, InviteHandler, LockoutHandler, PingHandler,
    RemoveHandler, UserIdHandler, UsercheckHandler,
};
use crate::registry::{CatalogEntry, CommandDefinition};
use crate::router::Subcommand;
use crate::types::{CommandKind, OptionSchema, SubcommandSchema};

fn canned(
    name: &str,
    description: &str,
    user_description: &str,
    message: &'static str,
    greeting: Greeting,
) -> Subcommand {
    Subcommand::new(
        SubcommandSchema::new(name, description).option(OptionSchema::user("user", user_description)),
        Arc::new(CannedReply::new(message, greeting)),
    )
}

fn member_option() -> OptionSchema {
    OptionSchema::string("member", "Member name (searches display name)")
        .required()
        .autocomplete()
}

fn context_menus(name: &str, message: &'static str, greeting: Greeting) -> [CatalogEntry; 2] {
    [CommandKind::User, CommandKind::Message].map(|kind| {
        CatalogEntry::Command(CommandDefinition::context_menu(
            kind,
            name,
            Arc::new(CannedReply::new(message, greeting)),
        ))
    })
}

/// Every command the bot serves, in load order.
pub fn builtin_catalog() -> Vec<CatalogEntry> {
    let mut entries = vec![
        CatalogEntry::category(
            "cat",
            "Cat reactions",
            vec![canned("sideeye", "That's sus...", "Target User", canned::SIDEEYE_GIF, Greeting::HiddenLink)],
        ),
        CatalogEntry::category(
            "dough",
            "Manage who is fronting on the Doughmination website",
            vec![
                Subcommand::new(
                    SubcommandSchema::new("add", "Add a member to the front").option(member_option()),
                    Arc::new(AddHandler),
                ),
                Subcommand::new(
                    SubcommandSchema::new("remove", "Remove a member from the front").option(member_option()),
                    Arc::new(RemoveHandler),
                ),
                Subcommand::new(
                    SubcommandSchema::new("health", "Check connection to Doughmination website API"),
                    Arc::new(HealthHandler),
                ),
                Subcommand::new(
                    SubcommandSchema::new("lockout", "🚨 EMERGENCY: Regenerate bot token (terminates current token)"),
                    Arc::new(LockoutHandler),
                ),
            ],
        ),
        CatalogEntry::category(
            "fun",
            "Silly replies and GIFs",
            vec![
                canned("cheese", "Send the cheese GIF!", "User to cheese", canned::CHEESE_GIF, Greeting::HiddenLink),
                canned("crazy", "I was crazy once", "User to annoy", canned::CRAZY, Greeting::YouKnowWhat),
                canned("gayzy", "I was gay once", "User to annoy", canned::GAYZY, Greeting::YouKnowWhat),
                canned("poof", "I'm outta here!", "Target User", canned::POOF_GIF, Greeting::HiddenLink),
                canned("stfu", "Your honour. You wasn't even there.", "Target User", canned::STFU_GIF, Greeting::HiddenLink),
            ],
        ),
        CatalogEntry::category(
            "hytale",
            "Hytale info and username checks",
            vec![
                canned("explain", "Explain Hytale", "User to notify", canned::HYTALE, Greeting::HytaleIntro),
                Subcommand::new(
                    SubcommandSchema::new("usercheck", "Check if a Hytale username is available")
                        .option(OptionSchema::string("username", "The username to check").required()),
                    Arc::new(UsercheckHandler),
                ),
            ],
        ),
        CatalogEntry::category(
            "plural",
            "Plurality resources",
            vec![
                canned("plurality", "Send information about plurality", "User to ping", canned::PLURALITY, Greeting::HeyThereNoComma),
                canned("pk", "Explain PluralKit", "The user to ping", canned::PK, Greeting::HeyThere),
                canned("plural", "Explain /plu/ral", "The user to ping", canned::PLURAL, Greeting::HeyThere),
                canned(
                    "userproxies",
                    "Send the tutorial on how to setup a userproxy",
                    "User to ping",
                    canned::USERPROXIES,
                    Greeting::HeyThereNoComma,
                ),
            ],
        ),
        CatalogEntry::category(
            "utils",
            "Utility commands",
            vec![
                Subcommand::new(SubcommandSchema::new("ping", "Check the bot's latency"), Arc::new(PingHandler)),
                canned("refresh", "Explain how to refresh clients", "The user to ping", canned::REFRESH, Greeting::HeyThere),
                Subcommand::new(
                    SubcommandSchema::new("help", "Display all available commands organized by category"),
                    Arc::new(HelpHandler),
                ),
                canned("adb", "Info about the Active Developer Badge", "User to inform about the badge", canned::ADB, Greeting::HeyThere),
                Subcommand::new(
                    SubcommandSchema::new("invite", "Display personal server invite link"),
                    Arc::new(InviteHandler),
                ),
                Subcommand::new(
                    SubcommandSchema::new("userid", "Display personal userid")
                        .option(OptionSchema::user("user", "The user to get the ID of")),
                    Arc::new(UserIdHandler),
                ),
            ],
        ),
    ];

    entries.extend(context_menus("Cheese", canned::CHEESE_GIF, Greeting::HiddenLink));
    entries.extend(context_menus("PK", canned::PK, Greeting::HeyThere));
    entries.extend(context_menus("DevBadge", canned::ADB, Greeting::HeyThere));
    entries
}
