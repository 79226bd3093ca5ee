//! Canned username lookup.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::LookupError;
use crate::{Availability, UsernameLookup, UsernameStatus};

/// Answers from a fixed table; unknown names are available, `fail` errors.
#[derive(Default)]
pub struct MockLookup {
    answers: HashMap<String, Availability>,
    fail: bool,
}

impl MockLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, username: &str, availability: Availability) -> Self {
        self.answers.insert(username.to_lowercase(), availability);
        self
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }
}

#[async_trait]
impl UsernameLookup for MockLookup {
    async fn check(&self, username: &str) -> Result<UsernameStatus, LookupError> {
        if self.fail {
            return Err(LookupError::UnexpectedStatus(503));
        }
        let availability = self
            .answers
            .get(&username.to_lowercase())
            .cloned()
            .unwrap_or(Availability::Available);
        Ok(UsernameStatus { availability, cached: false })
    }
}
