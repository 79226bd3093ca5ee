/// Category routing: one slash command fanning out to its subcommands.
use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use clove_core::{Interaction, Reply, Responder};
use tracing::debug;

use crate::dispatch::{CommandContext, CommandHandler, report_failure};
use crate::registry::{RegistryError, validate_name};
use crate::types::{CommandKind, SubcommandSchema};

pub struct Subcommand {
    pub schema: SubcommandSchema,
    pub handler: Arc<dyn CommandHandler>,
}

impl Subcommand {
    pub fn new(schema: SubcommandSchema, handler: Arc<dyn CommandHandler>) -> Self {
        Self { schema, handler }
    }
}

pub struct CategoryRouter {
    category: String,
    table: HashMap<String, Subcommand>,
    /// Declaration order, for deployment and help listings.
    order: Vec<String>,
}

impl CategoryRouter {
    pub fn new(category: &str) -> Self {
        Self { category: category.to_string(), table: HashMap::new(), order: Vec::new() }
    }

    pub fn add(&mut self, sub: Subcommand) -> Result<(), RegistryError> {
        validate_name(CommandKind::ChatInput, &sub.schema.name)?;
        if sub.schema.description.trim().is_empty() {
            return Err(RegistryError::MissingDescription(sub.schema.name));
        }
        if self.table.contains_key(&sub.schema.name) {
            return Err(RegistryError::Duplicate(format!("{} {}", self.category, sub.schema.name)));
        }
        self.order.push(sub.schema.name.clone());
        self.table.insert(sub.schema.name.clone(), sub);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn schemas(&self) -> Vec<SubcommandSchema> {
        self.order
            .iter()
            .filter_map(|name| self.table.get(name))
            .map(|sub| sub.schema.clone())
            .collect()
    }
}

#[async_trait]
impl CommandHandler for CategoryRouter {
    async fn execute(
        &self,
        ctx: &CommandContext,
        interaction: &Interaction,
        responder: &Responder,
    ) -> Result<()> {
        let requested = interaction.subcommand.as_deref().unwrap_or_default();
        let Some(sub) = self.table.get(requested) else {
            debug!(category = %self.category, subcommand = %requested, "Unknown subcommand");
            responder
                .send(Reply::text(format!("❌ Unknown subcommand `{requested}`.")).ephemeral())
                .await?;
            return Ok(());
        };

        if let Err(e) = sub.handler.execute(ctx, interaction, responder).await {
            report_failure(responder, &format!("{} {}", self.category, requested), &e).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{OWNER, TestContext, caller};
    use anyhow::bail;
    use clove_core::mock::{RecordingTransport, Sent};
    use std::sync::Mutex;

    struct Recorder {
        name: &'static str,
        calls: Arc<Mutex<Vec<&'static str>>>,
        fail: bool,
    }

    #[async_trait]
    impl CommandHandler for Recorder {
        async fn execute(&self, _: &CommandContext, _: &Interaction, responder: &Responder) -> Result<()> {
            self.calls.lock().unwrap().push(self.name);
            if self.fail {
                bail!("{} failed", self.name);
            }
            responder.reply(Reply::text(self.name)).await
        }
    }

    fn router(calls: &Arc<Mutex<Vec<&'static str>>>, fail_b: bool) -> CategoryRouter {
        let mut router = CategoryRouter::new("cat");
        for (name, fail) in [("a", false), ("b", fail_b)] {
            let handler = Arc::new(Recorder { name, calls: calls.clone(), fail });
            router.add(Subcommand::new(SubcommandSchema::new(name, "sub"), handler)).unwrap();
        }
        router
    }

    async fn run(router: &CategoryRouter, sub: &str) -> Vec<Sent> {
        let ctx = TestContext::new().build();
        let transport = Arc::new(RecordingTransport::new());
        let responder = Responder::new(transport.clone());
        let interaction = Interaction::chat_input(caller(OWNER), "cat").with_subcommand(sub);
        router.execute(&ctx, &interaction, &responder).await.unwrap();
        transport.sent()
    }

    #[tokio::test]
    async fn routes_to_named_subcommand() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sent = run(&router(&calls, false), "b").await;
        assert_eq!(*calls.lock().unwrap(), ["b"]);
        assert_eq!(sent, vec![Sent::Response(Reply::text("b"))]);
    }

    #[tokio::test]
    async fn unknown_subcommand_never_runs_a_handler() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sent = run(&router(&calls, false), "c").await;

        assert!(calls.lock().unwrap().is_empty());
        assert_eq!(sent.len(), 1);
        let Sent::Response(reply) = &sent[0] else { panic!("expected a reply") };
        assert!(reply.ephemeral);
        assert!(reply.content.as_deref().unwrap().contains("Unknown subcommand"));
    }

    #[tokio::test]
    async fn subcommand_failure_is_contained() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sent = run(&router(&calls, true), "b").await;
        assert_eq!(
            sent,
            vec![Sent::Response(
                Reply::text(crate::dispatch::GENERIC_FAILURE).ephemeral()
            )]
        );
    }

    #[test]
    fn schemas_keep_declaration_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let names: Vec<_> = router(&calls, false).schemas().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["a", "b"]);
    }
}
