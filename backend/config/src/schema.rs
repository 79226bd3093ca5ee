//! Clove runtime configuration schema.
//!
//! Every section is optional in the YAML file; missing keys take the
//! defaults below.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

pub const DEFAULT_FRONT_URL: &str = "https://doughmination.win";
pub const DEFAULT_USER_AGENT: &str = "CloveShortcuts/1.0.0";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloveConfig {
    /// Bot token and application id
    pub discord: DiscordConfig,

    /// Front-management API connection
    pub front: FrontConfig,

    /// Owner, friends and owner-only commands
    pub auth: AuthConfig,

    /// Who hears about front changes
    pub notify: NotifyConfig,

    /// Accounts-site login for username checks
    pub hytale: HytaleConfig,

    /// Static reply settings
    pub bot: BotConfig,

    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Needed only by `clove deploy`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontConfig {
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FrontConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_FRONT_URL.to_string(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    pub friend_ids: Vec<String>,
    pub owner_only_commands: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            owner_id: None,
            friend_ids: Vec::new(),
            owner_only_commands: vec!["dough".to_string()],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub user_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HytaleConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl HytaleConfig {
    /// Both halves of the login are present and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.email.as_deref(), self.password.as_deref()) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some((email, password))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invite_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Daily JSON log files are written here when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), dir: None }
    }
}

// ---------------------------------------------------------------------------
// Environment-only configuration
// ---------------------------------------------------------------------------

fn non_empty(env: &HashMap<String, String>, key: &str) -> Option<String> {
    env.get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn id_list(env: &HashMap<String, String>, key: &str) -> Vec<String> {
    non_empty(env, key)
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

impl CloveConfig {
    /// Build a config from process environment variables alone.
    pub fn from_env() -> Self {
        Self::from_env_map(&std::env::vars().collect())
    }

    pub fn from_env_map(env: &HashMap<String, String>) -> Self {
        let defaults = Self::default();
        Self {
            discord: DiscordConfig {
                token: non_empty(env, "DISCORD_TOKEN"),
                application_id: non_empty(env, "CLIENT_ID"),
            },
            front: FrontConfig {
                base_url: non_empty(env, "DOUGH_API_URL").unwrap_or(defaults.front.base_url),
                token: non_empty(env, "DOUGH_API_TOKEN"),
                ..defaults.front
            },
            auth: AuthConfig {
                owner_id: non_empty(env, "CLOVE_OWNER_ID"),
                friend_ids: id_list(env, "CLOVE_FRIEND_IDS"),
                ..defaults.auth
            },
            notify: NotifyConfig { user_ids: id_list(env, "CLOVE_NOTIFY_IDS") },
            hytale: HytaleConfig {
                email: non_empty(env, "HYTALE_EMAIL"),
                password: non_empty(env, "HYTALE_PASSWORD"),
            },
            bot: defaults.bot,
            logging: LoggingConfig {
                level: non_empty(env, "RUST_LOG").unwrap_or(defaults.logging.level),
                dir: non_empty(env, "CLOVE_LOG_DIR").map(PathBuf::from),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = "discord:\n  token: abc\nauth:\n  owner_id: \"1\"\n";
        let config: CloveConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.discord.token.as_deref(), Some("abc"));
        assert_eq!(config.front.base_url, DEFAULT_FRONT_URL);
        assert_eq!(config.front.timeout_secs, 10);
        assert_eq!(config.auth.owner_only_commands, vec!["dough"]);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn env_lists_are_comma_separated() {
        let config = CloveConfig::from_env_map(&env(&[
            ("DISCORD_TOKEN", "tok"),
            ("CLOVE_FRIEND_IDS", " 2, 3 ,,4"),
            ("CLOVE_NOTIFY_IDS", "5"),
            ("DOUGH_API_URL", ""),
        ]));

        assert_eq!(config.auth.friend_ids, vec!["2", "3", "4"]);
        assert_eq!(config.notify.user_ids, vec!["5"]);
        assert_eq!(config.front.base_url, DEFAULT_FRONT_URL);
        assert_eq!(config.front.token, None);
    }

    #[test]
    fn hytale_credentials_need_both_halves() {
        let mut hytale = HytaleConfig { email: Some("a@b.c".into()), password: None };
        assert!(hytale.credentials().is_none());
        hytale.password = Some("pw".into());
        assert_eq!(hytale.credentials(), Some(("a@b.c", "pw")));
    }
}
