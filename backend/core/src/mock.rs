//! In-memory transport and notifier that record everything sent through them.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use crate::reply::{AutocompleteChoice, Reply};
use crate::responder::Responder;
use crate::traits::{ComponentEvent, ComponentStream, InteractionTransport, Notifier};

/// One call made against a [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Response(Reply),
    Defer { ephemeral: bool },
    Edit(Reply),
    Followup(Reply),
    Update(Reply),
    Autocomplete(Vec<AutocompleteChoice>),
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Sent>>,
    queued: Mutex<Vec<ComponentEvent>>,
    /// Keep the component stream open after the queued events drain.
    hold_open: bool,
    fail: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with a transport error.
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    /// Component stream stays open until the collector's deadline.
    pub fn holding_open() -> Self {
        Self { hold_open: true, ..Self::default() }
    }

    pub fn sent(&self) -> Vec<Sent> {
        lock(&self.sent).clone()
    }

    /// Queue a component click; returns the transport bound to that click.
    pub fn push_component(
        &self,
        user_id: &str,
        custom_id: &str,
        values: &[&str],
    ) -> Arc<RecordingTransport> {
        let transport = Arc::new(RecordingTransport::new());
        lock(&self.queued).push(ComponentEvent {
            user_id: user_id.to_string(),
            custom_id: custom_id.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
            responder: Responder::new(transport.clone()),
        });
        transport
    }

    fn record(&self, sent: Sent) -> Result<()> {
        if self.fail {
            bail!("transport unavailable");
        }
        lock(&self.sent).push(sent);
        Ok(())
    }
}

#[async_trait]
impl InteractionTransport for RecordingTransport {
    async fn create_response(&self, reply: &Reply) -> Result<()> {
        self.record(Sent::Response(reply.clone()))
    }

    async fn defer(&self, ephemeral: bool) -> Result<()> {
        self.record(Sent::Defer { ephemeral })
    }

    async fn edit_response(&self, reply: &Reply) -> Result<()> {
        self.record(Sent::Edit(reply.clone()))
    }

    async fn create_followup(&self, reply: &Reply) -> Result<()> {
        self.record(Sent::Followup(reply.clone()))
    }

    async fn update_message(&self, reply: &Reply) -> Result<()> {
        self.record(Sent::Update(reply.clone()))
    }

    async fn autocomplete(&self, choices: &[AutocompleteChoice]) -> Result<()> {
        self.record(Sent::Autocomplete(choices.to_vec()))
    }

    async fn component_events(&self, _timeout: Duration) -> Result<ComponentStream> {
        let events: Vec<ComponentEvent> = lock(&self.queued).drain(..).collect();
        let queued = stream::iter(events);
        if self.hold_open {
            Ok(queued.chain(stream::pending()).boxed())
        } else {
            Ok(queued.boxed())
        }
    }
}

/// Records direct messages instead of delivering them.
#[derive(Default)]
pub struct RecordingNotifier {
    delivered: Mutex<Vec<(String, Reply)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> Vec<(String, Reply)> {
        lock(&self.delivered).clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn direct_message(&self, user_id: &str, reply: &Reply) -> Result<()> {
        lock(&self.delivered).push((user_id.to_string(), reply.clone()));
        Ok(())
    }
}
