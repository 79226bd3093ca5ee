/// Response bookkeeping for one interaction.
///
/// The platform allows a single primary reply per interaction; anything sent
/// afterwards must go through the follow-up channel. `Responder` remembers
/// which of the two has been used so callers can just say `send`.
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::error::CloveError;
use crate::reply::{AutocompleteChoice, Reply};
use crate::traits::{ComponentStream, InteractionTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseState {
    /// Nothing sent yet.
    Pending,
    /// Acknowledged; the primary reply is filled in later with an edit.
    Deferred,
    /// The primary reply carries content.
    Replied,
}

impl ResponseState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Pending,
            1 => Self::Deferred,
            _ => Self::Replied,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Deferred => 1,
            Self::Replied => 2,
        }
    }
}

pub struct Responder {
    transport: Arc<dyn InteractionTransport>,
    state: AtomicU8,
}

impl Responder {
    pub fn new(transport: Arc<dyn InteractionTransport>) -> Self {
        Self { transport, state: AtomicU8::new(ResponseState::Pending.as_u8()) }
    }

    pub fn state(&self) -> ResponseState {
        ResponseState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub fn has_responded(&self) -> bool {
        self.state() != ResponseState::Pending
    }

    fn set_state(&self, state: ResponseState) {
        self.state.store(state.as_u8(), Ordering::SeqCst);
    }

    fn ensure_pending(&self) -> Result<()> {
        if self.has_responded() {
            return Err(CloveError::AlreadyReplied.into());
        }
        Ok(())
    }

    /// Primary reply. Fails if the interaction was already answered.
    pub async fn reply(&self, reply: Reply) -> Result<()> {
        self.ensure_pending()?;
        self.transport.create_response(&reply).await?;
        self.set_state(ResponseState::Replied);
        Ok(())
    }

    pub async fn defer(&self, ephemeral: bool) -> Result<()> {
        self.ensure_pending()?;
        self.transport.defer(ephemeral).await?;
        self.set_state(ResponseState::Deferred);
        Ok(())
    }

    /// Fill in (or replace) the primary reply; replies directly when nothing
    /// has been sent yet.
    pub async fn edit(&self, reply: Reply) -> Result<()> {
        if !self.has_responded() {
            return self.reply(reply).await;
        }
        self.transport.edit_response(&reply).await?;
        self.set_state(ResponseState::Replied);
        Ok(())
    }

    pub async fn follow_up(&self, reply: Reply) -> Result<()> {
        if !self.has_responded() {
            return Err(CloveError::NotResponded.into());
        }
        self.transport.create_followup(&reply).await
    }

    /// Reply if nothing has been sent yet, otherwise follow up.
    pub async fn send(&self, reply: Reply) -> Result<()> {
        if self.has_responded() {
            self.follow_up(reply).await
        } else {
            self.reply(reply).await
        }
    }

    /// Component interactions: rewrite the message the component is attached to.
    pub async fn update(&self, reply: Reply) -> Result<()> {
        if self.has_responded() {
            return self.transport.edit_response(&reply).await;
        }
        self.transport.update_message(&reply).await?;
        self.set_state(ResponseState::Replied);
        Ok(())
    }

    pub async fn autocomplete(&self, choices: &[AutocompleteChoice]) -> Result<()> {
        self.ensure_pending()?;
        self.transport.autocomplete(choices).await?;
        self.set_state(ResponseState::Replied);
        Ok(())
    }

    pub async fn component_events(&self, timeout: Duration) -> Result<ComponentStream> {
        self.transport.component_events(timeout).await
    }
}
