/// Two-tier authorization gate.
///
/// One owner id gets everything, a short list of friend ids gets everything
/// except the owner-only commands, and every other caller is locked out.
use std::collections::HashSet;

use clove_core::{colors, Embed, Reply};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthLevel {
    Unauthorized = 0,
    Friend = 1,
    Owner = 2,
}

/// Why a caller was turned away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    /// Caller is neither the owner nor a friend.
    Unauthorized,
    /// A friend invoked an owner-only command.
    OwnerOnly { command: String },
}

impl Denial {
    /// Ephemeral notice explaining the denial.
    pub fn reply(&self) -> Reply {
        let (title, description) = match self {
            Denial::Unauthorized => (
                "🔒 Unauthorized".to_string(),
                "You are not authorized to use this bot.".to_string(),
            ),
            Denial::OwnerOnly { command } => (
                "🔒 Owner Only".to_string(),
                format!(
                    "The `/{command}` command is restricted to the bot owner for security reasons."
                ),
            ),
        };

        Reply::embed(
            Embed::new()
                .color(colors::RED)
                .title(title)
                .description(description)
                .footer("Access restricted")
                .timestamp(),
        )
        .ephemeral()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthGate {
    owner_id: String,
    friend_ids: HashSet<String>,
    owner_only: HashSet<String>,
}

impl AuthGate {
    pub fn new(
        owner_id: impl Into<String>,
        friend_ids: impl IntoIterator<Item = impl Into<String>>,
        owner_only: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            friend_ids: friend_ids.into_iter().map(Into::into).collect(),
            owner_only: owner_only.into_iter().map(Into::into).collect(),
        }
    }

    /// Owner match beats friend membership; everything else is unauthorized.
    pub fn auth_level(&self, caller_id: &str) -> AuthLevel {
        if !self.owner_id.is_empty() && caller_id == self.owner_id {
            return AuthLevel::Owner;
        }
        if self.friend_ids.contains(caller_id) {
            return AuthLevel::Friend;
        }
        AuthLevel::Unauthorized
    }

    pub fn is_owner_only(&self, command: &str) -> bool {
        self.owner_only.contains(command)
    }

    pub fn is_authorized(&self, caller_id: &str, command: &str) -> bool {
        self.check(caller_id, Some(command)).is_ok()
    }

    /// Gate one interaction. `command` is `None` for interactions without a
    /// command name, which only require a non-unauthorized caller.
    pub fn check(&self, caller_id: &str, command: Option<&str>) -> Result<AuthLevel, Denial> {
        match self.auth_level(caller_id) {
            AuthLevel::Unauthorized => {
                debug!(caller = %caller_id, "Caller is not on the access list");
                Err(Denial::Unauthorized)
            }
            AuthLevel::Owner => Ok(AuthLevel::Owner),
            AuthLevel::Friend => match command {
                Some(cmd) if self.is_owner_only(cmd) => {
                    debug!(caller = %caller_id, command = %cmd, "Friend hit an owner-only command");
                    Err(Denial::OwnerOnly { command: cmd.to_string() })
                }
                _ => Ok(AuthLevel::Friend),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: &str = "1025770042245251122";
    const FRIEND: &str = "652597508027187240";

    fn gate() -> AuthGate {
        AuthGate::new(OWNER, [FRIEND, "810257561596461166"], ["dough"])
    }

    const COMMANDS: &[&str] = &["dough", "fun", "utils", "plural", "hytale", "cat", "Cheese"];

    #[test]
    fn level_priority() {
        let g = gate();
        assert_eq!(g.auth_level(OWNER), AuthLevel::Owner);
        assert_eq!(g.auth_level(FRIEND), AuthLevel::Friend);
        assert_eq!(g.auth_level("123"), AuthLevel::Unauthorized);
        assert!(AuthLevel::Unauthorized < AuthLevel::Friend && AuthLevel::Friend < AuthLevel::Owner);
    }

    #[test]
    fn owner_listed_as_friend_is_still_owner() {
        let g = AuthGate::new(OWNER, [OWNER], ["dough"]);
        assert_eq!(g.auth_level(OWNER), AuthLevel::Owner);
        assert!(g.is_authorized(OWNER, "dough"));
    }

    #[test]
    fn strangers_are_denied_everything() {
        let g = gate();
        for id in ["", "1", "999999999999999999", "owner"] {
            for cmd in COMMANDS {
                assert!(!g.is_authorized(id, cmd), "{id} should not run {cmd}");
            }
        }
    }

    #[test]
    fn friends_are_denied_only_restricted_commands() {
        let g = gate();
        assert!(!g.is_authorized(FRIEND, "dough"));
        for cmd in COMMANDS.iter().filter(|c| **c != "dough") {
            assert!(g.is_authorized(FRIEND, cmd));
        }
    }

    #[test]
    fn owner_is_allowed_everything() {
        let g = gate();
        for cmd in COMMANDS {
            assert!(g.is_authorized(OWNER, cmd));
        }
    }

    #[test]
    fn empty_owner_id_never_matches() {
        let g = AuthGate::new("", Vec::<String>::new(), ["dough"]);
        assert_eq!(g.auth_level(""), AuthLevel::Unauthorized);
    }

    #[test]
    fn commandless_interactions_need_any_level() {
        let g = gate();
        assert_eq!(g.check(FRIEND, None), Ok(AuthLevel::Friend));
        assert_eq!(g.check("stranger", None), Err(Denial::Unauthorized));
    }

    #[test]
    fn denial_messages_differ_by_reason() {
        let g = gate();
        let lockout = g.check("stranger", Some("fun")).unwrap_err().reply();
        let owner_only = g.check(FRIEND, Some("dough")).unwrap_err().reply();

        assert!(lockout.ephemeral && owner_only.ephemeral);
        assert_eq!(lockout.embeds[0].title.as_deref(), Some("🔒 Unauthorized"));
        assert_eq!(owner_only.embeds[0].title.as_deref(), Some("🔒 Owner Only"));
        assert!(owner_only.embeds[0].description.as_deref().unwrap().contains("`/dough`"));
        assert_eq!(lockout.embeds[0].color, Some(colors::RED));
    }
}
