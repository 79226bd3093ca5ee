/// Interaction dispatch: gate, autocomplete, route, execute, report.
///
/// Every inbound interaction passes through [`InteractionDispatcher::dispatch`].
/// Nothing a handler does can escape it; failures become a private error
/// reply and the bot keeps serving.
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use clove_core::{Interaction, InteractionKind, Notifier, Reply, Responder};
use clove_front::FrontApi;
use clove_hytale::UsernameLookup;
use clove_security::AuthGate;
use tracing::{debug, error, info, warn};

use crate::autocomplete::AutocompleteResolver;
use crate::help::HelpIndex;
use crate::registry::CommandRegistry;
use crate::types::CommandKind;

pub const GENERIC_FAILURE: &str = "There was an error while executing this command!";
pub const DEFAULT_INVITE_LINK: &str = "https://discord.gg/k8HrBvDaQn";

// ---------------------------------------------------------------------------
// Handler trait
// ---------------------------------------------------------------------------

/// Static settings handlers read at run time.
#[derive(Debug, Clone)]
pub struct BotSettings {
    pub invite_link: String,
    /// Users who get a DM whenever the front changes.
    pub notify_user_ids: Vec<String>,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self { invite_link: DEFAULT_INVITE_LINK.to_string(), notify_user_ids: Vec::new() }
    }
}

/// Collaborators shared by every handler. Built once at startup.
pub struct CommandContext {
    pub front: Arc<dyn FrontApi>,
    pub usernames: Arc<dyn UsernameLookup>,
    pub gate: Arc<AuthGate>,
    pub notifier: Arc<dyn Notifier>,
    pub settings: BotSettings,
    pub help: HelpIndex,
}

#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn execute(
        &self,
        ctx: &CommandContext,
        interaction: &Interaction,
        responder: &Responder,
    ) -> Result<()>;
}

/// Log a handler failure and tell the caller, on whichever channel is still open.
pub(crate) async fn report_failure(responder: &Responder, command: &str, err: &anyhow::Error) {
    error!(command = %command, error = ?err, "Error executing command");
    let notice = Reply::text(GENERIC_FAILURE).ephemeral();
    if let Err(send_err) = responder.send(notice).await {
        warn!(command = %command, error = %send_err, "Could not deliver failure notice");
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// How one dispatch cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Denied,
    Autocompleted,
    /// Interaction kind the bot does not handle (component clicks, modals...).
    Ignored,
    NotFound,
    Executed,
    Failed,
}

pub struct InteractionDispatcher {
    registry: Arc<CommandRegistry>,
    ctx: Arc<CommandContext>,
    autocomplete: AutocompleteResolver,
}

impl InteractionDispatcher {
    pub fn new(registry: Arc<CommandRegistry>, ctx: Arc<CommandContext>) -> Self {
        let autocomplete = AutocompleteResolver::new(ctx.front.clone());
        Self { registry, ctx, autocomplete }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn context(&self) -> &CommandContext {
        &self.ctx
    }

    pub async fn dispatch(&self, interaction: &Interaction, responder: &Responder) -> DispatchOutcome {
        // Only typed commands and their autocomplete queries are checked by name.
        let gated_name = match interaction.kind {
            InteractionKind::ChatInput | InteractionKind::Autocomplete => {
                Some(interaction.command_name.as_str())
            }
            _ => None,
        };

        if let Err(denial) = self.ctx.gate.check(&interaction.caller.id, gated_name) {
            info!(
                caller = %interaction.caller.id,
                command = %interaction.command_name,
                "Interaction denied"
            );
            let sent = if interaction.kind == InteractionKind::Autocomplete {
                responder.autocomplete(&[]).await
            } else {
                responder.send(denial.reply()).await
            };
            if let Err(e) = sent {
                warn!(error = %e, "Could not deliver denial");
            }
            return DispatchOutcome::Denied;
        }

        if interaction.kind == InteractionKind::Autocomplete {
            let choices = self.autocomplete.resolve(interaction).await;
            if let Err(e) = responder.autocomplete(&choices).await {
                warn!(command = %interaction.command_name, error = %e, "Could not answer autocomplete");
            }
            return DispatchOutcome::Autocompleted;
        }

        let Some(kind) = CommandKind::from_interaction(interaction.kind) else {
            debug!(kind = ?interaction.kind, "Ignoring unsupported interaction");
            return DispatchOutcome::Ignored;
        };

        let Some(command) = self.registry.get(kind, &interaction.command_name) else {
            warn!(command = %interaction.command_name, kind = kind.label(), "No command matching name was found");
            return DispatchOutcome::NotFound;
        };

        debug!(command = %interaction.qualified_name(), caller = %interaction.caller.tag, "Dispatching");
        match command.handler.execute(&self.ctx, interaction, responder).await {
            Ok(()) => DispatchOutcome::Executed,
            Err(e) => {
                report_failure(responder, &interaction.command_name, &e).await;
                DispatchOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{CatalogEntry, CommandDefinition};
    use crate::testing::{FRIEND, OWNER, TestContext, caller};
    use anyhow::bail;
    use clove_core::mock::{RecordingTransport, Sent};
    use clove_core::{AutocompleteChoice, OptionValue};
    use clove_front::Member;
    use clove_front::mock::MockFrontApi;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting(Arc<AtomicUsize>);

    #[async_trait]
    impl CommandHandler for Counting {
        async fn execute(&self, _: &CommandContext, _: &Interaction, responder: &Responder) -> Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            responder.reply(Reply::text("ok")).await
        }
    }

    struct Exploding {
        defer_first: bool,
    }

    #[async_trait]
    impl CommandHandler for Exploding {
        async fn execute(&self, _: &CommandContext, _: &Interaction, responder: &Responder) -> Result<()> {
            if self.defer_first {
                responder.defer(true).await?;
            }
            bail!("boom")
        }
    }

    fn dispatcher_with(entries: Vec<CatalogEntry>, ctx: TestContext) -> InteractionDispatcher {
        let registry = Arc::new(CommandRegistry::load(entries));
        InteractionDispatcher::new(registry, Arc::new(ctx.build()))
    }

    fn responder() -> (Arc<RecordingTransport>, Responder) {
        let transport = Arc::new(RecordingTransport::new());
        (transport.clone(), Responder::new(transport))
    }

    fn counting(name: &str) -> (Arc<AtomicUsize>, CatalogEntry) {
        let hits = Arc::new(AtomicUsize::new(0));
        let def = CommandDefinition::chat_input(name, "test", Arc::new(Counting(hits.clone())));
        (hits, CatalogEntry::Command(def))
    }

    #[tokio::test]
    async fn stranger_is_denied_before_anything_runs() {
        let (hits, entry) = counting("fun");
        let d = dispatcher_with(vec![entry], TestContext::new());
        let (transport, r) = responder();

        let outcome = d.dispatch(&Interaction::chat_input(caller("999"), "fun"), &r).await;

        assert_eq!(outcome, DispatchOutcome::Denied);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        match &sent[0] {
            Sent::Response(reply) => {
                assert!(reply.ephemeral);
                assert_eq!(reply.embeds[0].title.as_deref(), Some("🔒 Unauthorized"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn friend_gets_owner_only_notice() {
        let (hits, entry) = counting("dough");
        let d = dispatcher_with(vec![entry], TestContext::new());
        let (transport, r) = responder();

        let outcome = d.dispatch(&Interaction::chat_input(caller(FRIEND), "dough"), &r).await;

        assert_eq!(outcome, DispatchOutcome::Denied);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        let Sent::Response(reply) = &transport.sent()[0] else { panic!("expected response") };
        assert_eq!(reply.embeds[0].title.as_deref(), Some("🔒 Owner Only"));
    }

    #[tokio::test]
    async fn denied_autocomplete_gets_empty_suggestions() {
        let d = dispatcher_with(vec![], TestContext::new());
        let (transport, r) = responder();
        let query = Interaction::autocomplete(caller(FRIEND), "dough", "member", "al").with_subcommand("add");

        assert_eq!(d.dispatch(&query, &r).await, DispatchOutcome::Denied);
        assert_eq!(transport.sent(), vec![Sent::Autocomplete(vec![])]);
    }

    #[tokio::test]
    async fn autocomplete_short_circuits_routing() {
        let front = MockFrontApi::new(vec![
            Member::new("1", "Alice"),
            Member::new("2", "Bob"),
            Member::new("3", "Alina"),
        ]);
        let (hits, entry) = counting("dough");
        let d = dispatcher_with(vec![entry], TestContext::new().front(front));
        let (transport, r) = responder();
        let query = Interaction::autocomplete(caller(OWNER), "dough", "member", "ali").with_subcommand("add");

        assert_eq!(d.dispatch(&query, &r).await, DispatchOutcome::Autocompleted);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(
            transport.sent(),
            vec![Sent::Autocomplete(vec![
                AutocompleteChoice::same("Alice"),
                AutocompleteChoice::same("Alina"),
            ])]
        );
    }

    #[tokio::test]
    async fn components_pass_for_friends_and_are_ignored() {
        let d = dispatcher_with(vec![], TestContext::new());
        let (transport, r) = responder();
        let click = Interaction::new(InteractionKind::Component, caller(FRIEND), "");

        assert_eq!(d.dispatch(&click, &r).await, DispatchOutcome::Ignored);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn components_from_strangers_are_denied() {
        let d = dispatcher_with(vec![], TestContext::new());
        let (transport, r) = responder();
        let click = Interaction::new(InteractionKind::Component, caller("999"), "");

        assert_eq!(d.dispatch(&click, &r).await, DispatchOutcome::Denied);
        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn unknown_command_sends_nothing() {
        let d = dispatcher_with(vec![], TestContext::new());
        let (transport, r) = responder();

        let outcome = d.dispatch(&Interaction::chat_input(caller(OWNER), "nope"), &r).await;
        assert_eq!(outcome, DispatchOutcome::NotFound);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn routes_by_command_kind() {
        let hits = Arc::new(AtomicUsize::new(0));
        let user_menu = CommandDefinition::context_menu(CommandKind::User, "Cheese", Arc::new(Counting(hits.clone())));
        let d = dispatcher_with(vec![CatalogEntry::Command(user_menu)], TestContext::new());

        let (_, r) = responder();
        let msg_click = Interaction::new(InteractionKind::MessageContext, caller(FRIEND), "Cheese");
        assert_eq!(d.dispatch(&msg_click, &r).await, DispatchOutcome::NotFound);

        let (_, r) = responder();
        let user_click = Interaction::new(InteractionKind::UserContext, caller(FRIEND), "Cheese")
            .with_target_user("7");
        assert_eq!(d.dispatch(&user_click, &r).await, DispatchOutcome::Executed);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn handler_error_becomes_single_reply() {
        let def = CommandDefinition::chat_input("boom", "explodes", Arc::new(Exploding { defer_first: false }));
        let d = dispatcher_with(vec![CatalogEntry::Command(def)], TestContext::new());
        let (transport, r) = responder();

        let outcome = d.dispatch(&Interaction::chat_input(caller(OWNER), "boom"), &r).await;

        assert_eq!(outcome, DispatchOutcome::Failed);
        assert_eq!(
            transport.sent(),
            vec![Sent::Response(Reply::text(GENERIC_FAILURE).ephemeral())]
        );
    }

    #[tokio::test]
    async fn handler_error_after_defer_uses_follow_up() {
        let def = CommandDefinition::chat_input("boom", "explodes", Arc::new(Exploding { defer_first: true }));
        let d = dispatcher_with(vec![CatalogEntry::Command(def)], TestContext::new());
        let (transport, r) = responder();

        d.dispatch(&Interaction::chat_input(caller(OWNER), "boom"), &r).await;

        assert_eq!(
            transport.sent(),
            vec![
                Sent::Defer { ephemeral: true },
                Sent::Followup(Reply::text(GENERIC_FAILURE).ephemeral()),
            ]
        );
    }

    #[tokio::test]
    async fn options_reach_the_handler() {
        struct Echo;

        #[async_trait]
        impl CommandHandler for Echo {
            async fn execute(&self, _: &CommandContext, i: &Interaction, r: &Responder) -> Result<()> {
                r.reply(Reply::text(i.string("text").unwrap_or("-"))).await
            }
        }

        let def = CommandDefinition::chat_input("echo", "echo", Arc::new(Echo));
        let d = dispatcher_with(vec![CatalogEntry::Command(def)], TestContext::new());
        let (transport, r) = responder();
        let i = Interaction::chat_input(caller(FRIEND), "echo")
            .with_option("text", OptionValue::String("hi".into()));

        d.dispatch(&i, &r).await;
        assert_eq!(transport.sent(), vec![Sent::Response(Reply::text("hi"))]);
    }
}
