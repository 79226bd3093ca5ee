//! In-memory stand-in for the front-management API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::client::FrontApi;
use crate::error::FrontApiError;
use crate::types::{Fronters, Health, Member, SwitchResult, TokenRotation};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Holds a member directory and an active set; `switch` replaces the set.
#[derive(Default)]
pub struct MockFrontApi {
    members: Vec<Member>,
    fronting: Mutex<Vec<String>>,
    switches: Mutex<Vec<Vec<String>>>,
    fronter_fetches: AtomicUsize,
    /// Every call fails with this detail.
    failure: Option<String>,
    /// `switch` answers with a non-success status carrying this message.
    reject_switch: Option<String>,
}

impl MockFrontApi {
    pub fn new(members: Vec<Member>) -> Self {
        Self { members, ..Default::default() }
    }

    pub fn with_fronting(self, ids: &[&str]) -> Self {
        *lock(&self.fronting) = ids.iter().map(|id| id.to_string()).collect();
        self
    }

    pub fn failing(detail: impl Into<String>) -> Self {
        Self { failure: Some(detail.into()), ..Default::default() }
    }

    pub fn rejecting_switch(mut self, message: impl Into<String>) -> Self {
        self.reject_switch = Some(message.into());
        self
    }

    /// Every id list passed to `switch`, in call order.
    pub fn switches(&self) -> Vec<Vec<String>> {
        lock(&self.switches).clone()
    }

    pub fn fronter_fetches(&self) -> usize {
        self.fronter_fetches.load(Ordering::SeqCst)
    }

    fn check(&self, action: &'static str) -> Result<(), FrontApiError> {
        match &self.failure {
            Some(detail) => Err(FrontApiError::new(action, detail.clone())),
            None => Ok(()),
        }
    }

    fn resolve(&self, ids: &[String]) -> Vec<Member> {
        ids.iter()
            .filter_map(|id| self.members.iter().find(|m| &m.id == id).cloned())
            .collect()
    }
}

#[async_trait]
impl FrontApi for MockFrontApi {
    async fn health(&self) -> Result<Health, FrontApiError> {
        self.check("Health check failed")?;
        Ok(Health { status: "ok".to_string(), authenticated: true })
    }

    async fn members(&self) -> Result<Vec<Member>, FrontApiError> {
        self.check("Failed to get members")?;
        Ok(self.members.clone())
    }

    async fn fronters(&self) -> Result<Fronters, FrontApiError> {
        self.check("Failed to get fronters")?;
        self.fronter_fetches.fetch_add(1, Ordering::SeqCst);
        let ids = lock(&self.fronting).clone();
        Ok(Fronters { members: self.resolve(&ids) })
    }

    async fn switch(&self, member_ids: &[String]) -> Result<SwitchResult, FrontApiError> {
        self.check("Failed to switch fronters")?;
        lock(&self.switches).push(member_ids.to_vec());
        if let Some(message) = &self.reject_switch {
            return Ok(SwitchResult {
                status: "error".to_string(),
                message: message.clone(),
                ..Default::default()
            });
        }
        *lock(&self.fronting) = member_ids.to_vec();
        let fronters = self.resolve(member_ids);
        Ok(SwitchResult {
            status: "success".to_string(),
            message: "Switched".to_string(),
            count: fronters.len(),
            fronters,
        })
    }

    async fn regenerate_token(&self) -> Result<TokenRotation, FrontApiError> {
        self.check("Failed to regenerate token")?;
        Ok(TokenRotation {
            success: true,
            message: "Token regenerated".to_string(),
            new_token: "new-token-123".to_string(),
        })
    }
}
