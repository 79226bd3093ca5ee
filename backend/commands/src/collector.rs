/// Time-boxed component collector.
///
/// Listens for button and select clicks on the reply of one interaction until
/// the flow says stop or the deadline passes, then runs the flow's `finish`
/// exactly once.
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use clove_core::{ComponentEvent, Reply, Responder};
use clove_security::{AuthGate, AuthLevel};
use futures::StreamExt;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

#[async_trait]
pub trait ComponentFlow: Send {
    /// Ephemeral reply for authorized users clicking someone else's menu.
    fn foreign_notice(&self) -> &str;

    /// Handle one click from the invoker.
    async fn on_event(&mut self, event: &ComponentEvent) -> Result<Flow>;

    /// Runs once after the last event. `collected` counts invoker clicks.
    async fn finish(&mut self, collected: usize) -> Result<()>;
}

/// Drive `flow` with clicks on `responder`'s reply message.
pub async fn run(
    responder: &Responder,
    invoker: &str,
    gate: &AuthGate,
    timeout: Duration,
    flow: &mut dyn ComponentFlow,
) -> Result<usize> {
    let mut events = responder.component_events(timeout).await?;
    let deadline = Instant::now() + timeout;
    let mut collected = 0;
    let mut failure = None;

    loop {
        let event = tokio::select! {
            event = events.next() => event,
            _ = sleep_until(deadline) => {
                debug!(invoker = %invoker, "Collector timed out");
                None
            }
        };
        let Some(event) = event else { break };

        if event.user_id != invoker {
            // Unauthorized clickers are answered by the dispatcher's gate.
            if gate.auth_level(&event.user_id) > AuthLevel::Unauthorized {
                let notice = Reply::text(flow.foreign_notice()).ephemeral();
                if let Err(e) = event.responder.reply(notice).await {
                    warn!(user = %event.user_id, error = %e, "Could not send foreign-click notice");
                }
            }
            continue;
        }

        collected += 1;
        match flow.on_event(&event).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Stop) => break,
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }

    // Release the platform listener before the final edit.
    drop(events);
    flow.finish(collected).await?;
    match failure {
        Some(e) => Err(e),
        None => Ok(collected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FRIEND, OWNER, gate};
    use clove_core::mock::{RecordingTransport, Sent};
    use std::sync::Arc;

    #[derive(Default)]
    struct Script {
        seen: Vec<String>,
        finished: Vec<usize>,
        stop_on: Option<&'static str>,
    }

    #[async_trait]
    impl ComponentFlow for Script {
        fn foreign_notice(&self) -> &str {
            "not yours"
        }

        async fn on_event(&mut self, event: &ComponentEvent) -> Result<Flow> {
            self.seen.push(event.custom_id.clone());
            event.responder.update(Reply::text(&event.custom_id)).await?;
            if Some(event.custom_id.as_str()) == self.stop_on {
                return Ok(Flow::Stop);
            }
            Ok(Flow::Continue)
        }

        async fn finish(&mut self, collected: usize) -> Result<()> {
            self.finished.push(collected);
            Ok(())
        }
    }

    #[tokio::test]
    async fn stops_on_terminal_choice() {
        let transport = Arc::new(RecordingTransport::holding_open());
        transport.push_component(OWNER, "first", &[]);
        transport.push_component(OWNER, "done", &[]);
        transport.push_component(OWNER, "after", &[]);
        let responder = Responder::new(transport);
        let mut flow = Script { stop_on: Some("done"), ..Default::default() };

        let collected = run(&responder, OWNER, &gate(), Duration::from_secs(5), &mut flow).await.unwrap();

        assert_eq!(collected, 2);
        assert_eq!(flow.seen, ["first", "done"]);
        assert_eq!(flow.finished, [2]);
    }

    #[tokio::test]
    async fn foreign_clicks_never_reach_the_flow() {
        let transport = Arc::new(RecordingTransport::new());
        let friend_click = transport.push_component(FRIEND, "x", &[]);
        let stranger_click = transport.push_component("999", "x", &[]);
        let responder = Responder::new(transport);
        let mut flow = Script::default();

        let collected = run(&responder, OWNER, &gate(), Duration::from_secs(5), &mut flow).await.unwrap();

        assert_eq!(collected, 0);
        assert!(flow.seen.is_empty());
        assert_eq!(flow.finished, [0]);
        assert_eq!(friend_click.sent(), vec![Sent::Response(Reply::text("not yours").ephemeral())]);
        assert!(stranger_click.sent().is_empty());
    }

    #[tokio::test]
    async fn deadline_ends_an_idle_collector() {
        let transport = Arc::new(RecordingTransport::holding_open());
        let responder = Responder::new(transport);
        let mut flow = Script::default();

        let collected = run(&responder, OWNER, &gate(), Duration::from_millis(20), &mut flow).await.unwrap();

        assert_eq!(collected, 0);
        assert_eq!(flow.finished, [0]);
    }

    #[tokio::test]
    async fn flow_error_still_finishes_once() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_component(OWNER, "x", &[]);
        let responder = Responder::new(transport);
        // Replying to the same click twice fails inside the flow.
        struct Twice(usize);

        #[async_trait]
        impl ComponentFlow for Twice {
            fn foreign_notice(&self) -> &str {
                ""
            }
            async fn on_event(&mut self, event: &ComponentEvent) -> Result<Flow> {
                event.responder.reply(Reply::text("one")).await?;
                event.responder.reply(Reply::text("two")).await?;
                Ok(Flow::Continue)
            }
            async fn finish(&mut self, _: usize) -> Result<()> {
                self.0 += 1;
                Ok(())
            }
        }

        let mut flow = Twice(0);
        let result = run(&responder, OWNER, &gate(), Duration::from_secs(5), &mut flow).await;
        assert!(result.is_err());
        assert_eq!(flow.0, 1);
    }
}
