//! Shared fixtures for unit tests.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use clove_core::mock::RecordingNotifier;
use clove_core::{Caller, Interaction, Responder};
use clove_front::mock::MockFrontApi;
use clove_front::FrontApi;
use clove_hytale::mock::MockLookup;
use clove_hytale::UsernameLookup;
use clove_security::AuthGate;

use crate::dispatch::{BotSettings, CommandContext, CommandHandler};
use crate::help::HelpIndex;

pub const OWNER: &str = "1025770042245251122";
pub const FRIEND: &str = "652597508027187240";

pub fn caller(id: &str) -> Caller {
    Caller::new(id, format!("user{id}"))
}

pub fn gate() -> AuthGate {
    AuthGate::new(OWNER, [FRIEND], ["dough"])
}

/// Handler that does nothing.
pub struct Silent;

#[async_trait]
impl CommandHandler for Silent {
    async fn execute(&self, _: &CommandContext, _: &Interaction, _: &Responder) -> Result<()> {
        Ok(())
    }
}

pub struct TestContext {
    front: Arc<dyn FrontApi>,
    usernames: Arc<dyn UsernameLookup>,
    notifier: Arc<RecordingNotifier>,
    settings: BotSettings,
    help: HelpIndex,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            front: Arc::new(MockFrontApi::new(Vec::new())),
            usernames: Arc::new(MockLookup::new()),
            notifier: Arc::new(RecordingNotifier::new()),
            settings: BotSettings::default(),
            help: HelpIndex::default(),
        }
    }

    pub fn front(mut self, front: MockFrontApi) -> Self {
        self.front = Arc::new(front);
        self
    }

    pub fn front_arc(mut self, front: Arc<MockFrontApi>) -> Self {
        self.front = front;
        self
    }

    pub fn usernames(mut self, lookup: MockLookup) -> Self {
        self.usernames = Arc::new(lookup);
        self
    }

    pub fn notifier(mut self, notifier: Arc<RecordingNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn notify(mut self, ids: &[&str]) -> Self {
        self.settings.notify_user_ids = ids.iter().map(|id| id.to_string()).collect();
        self
    }

    pub fn help(mut self, help: HelpIndex) -> Self {
        self.help = help;
        self
    }

    pub fn build(self) -> CommandContext {
        CommandContext {
            front: self.front,
            usernames: self.usernames,
            gate: Arc::new(gate()),
            notifier: self.notifier,
            settings: self.settings,
            help: self.help,
        }
    }
}
