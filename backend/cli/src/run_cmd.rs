//! `clove run`: wire every collaborator together and connect to Discord.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use clove_channels::{ChannelAdapter, DiscordAdapter, DiscordNotifier};
use clove_commands::{
    builtin_catalog, BotSettings, CommandContext, CommandRegistry, HelpIndex, InteractionDispatcher,
};
use clove_config::{CloveConfig, ValidationReport};
use clove_front::{FrontClient, FrontClientConfig};
use clove_hytale::public::DEFAULT_CHECKER_URL;
use clove_hytale::{AccountEndpoints, AccountLookup, Credentials, PublicLookup, UsernameLookup};
use clove_security::AuthGate;
use serenity::all::Http;
use tracing::info;

use crate::terminal_output::print_findings;

fn username_lookup(config: &CloveConfig) -> Result<Arc<dyn UsernameLookup>> {
    Ok(match config.hytale.credentials() {
        Some((email, password)) => {
            info!("Username checks use the Hytale accounts site");
            Arc::new(AccountLookup::new(Credentials::new(email, password), AccountEndpoints::default())?)
        }
        None => {
            info!(url = DEFAULT_CHECKER_URL, "Username checks use the public checker");
            Arc::new(PublicLookup::new(DEFAULT_CHECKER_URL)?)
        }
    })
}

fn settings(config: &CloveConfig) -> BotSettings {
    let defaults = BotSettings::default();
    BotSettings {
        invite_link: config.bot.invite_link.clone().unwrap_or(defaults.invite_link),
        notify_user_ids: config.notify.user_ids.clone(),
    }
}

/// Show every finding before connecting. Errors stop the start; warnings
/// only disable features.
fn preflight(report: &ValidationReport) -> Result<()> {
    print_findings(report);
    if !report.is_valid() {
        bail!("Config has {} error(s); see `clove config`", report.errors.len());
    }
    Ok(())
}

pub async fn run(config: &CloveConfig, report: &ValidationReport) -> Result<()> {
    preflight(report)?;
    let (Some(token), Some(owner_id)) = (config.discord.token.clone(), config.auth.owner_id.clone()) else {
        bail!("Discord token and owner id are required");
    };

    let front = FrontClient::new(FrontClientConfig {
        base_url: config.front.base_url.clone(),
        token: config.front.token.clone().unwrap_or_default(),
        user_agent: config.front.user_agent.clone(),
        timeout: Duration::from_secs(config.front.timeout_secs),
    })?;

    let gate = AuthGate::new(
        owner_id,
        config.auth.friend_ids.clone(),
        config.auth.owner_only_commands.clone(),
    );

    let registry = Arc::new(CommandRegistry::load(builtin_catalog()));
    let ctx = Arc::new(CommandContext {
        front: Arc::new(front),
        usernames: username_lookup(config)?,
        gate: Arc::new(gate),
        notifier: Arc::new(DiscordNotifier::new(Arc::new(Http::new(&token)))),
        settings: settings(config),
        help: HelpIndex::from_registry(&registry),
    });
    let dispatcher = Arc::new(InteractionDispatcher::new(registry, ctx));

    let adapter = DiscordAdapter::new(token);
    info!(adapter = adapter.name(), "Starting Clove");

    tokio::select! {
        result = adapter.start(dispatcher) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl-C, shutting down");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal_output::report_lines;
    use clove_config::validate;

    #[test]
    fn settings_fall_back_to_the_default_invite() {
        let mut config = CloveConfig::default();
        config.notify.user_ids = vec!["5".into()];
        let built = settings(&config);
        assert_eq!(built.invite_link, BotSettings::default().invite_link);
        assert_eq!(built.notify_user_ids, vec!["5"]);

        config.bot.invite_link = Some("https://discord.gg/abc".into());
        assert_eq!(settings(&config).invite_link, "https://discord.gg/abc");
    }

    #[tokio::test]
    async fn incomplete_config_refuses_to_start() {
        let config = CloveConfig::default();
        let err = run(&config, &validate(&config)).await.unwrap_err();
        assert!(err.to_string().contains("error(s)"));
    }

    #[test]
    fn warnings_are_shown_without_blocking_the_start() {
        let mut config = CloveConfig::default();
        config.discord.token = Some("tok".into());
        config.auth.owner_id = Some("1".into());
        config.auth.friend_ids = vec!["1".into()];
        let report = validate(&config);

        assert!(preflight(&report).is_ok());
        let shown: Vec<_> = report_lines(&report).into_iter().map(|(_, line)| line).collect();
        assert_eq!(
            shown,
            vec![
                "auth.friend_ids[0]: Owner is also listed as a friend",
                "front.token: No front API token; /dough commands will fail",
                "hytale: No Hytale login; username checks use the public checker",
            ]
        );
        assert!(print_findings(&report));
    }
}
