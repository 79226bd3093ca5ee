//! `clove-hytale` — username availability lookups.
//!
//! Two backends answer the same question: a public checker service, and the
//! accounts site itself, which needs a logged-in session cookie.

pub mod account;
pub mod cookies;
pub mod error;
pub mod mock;
pub mod public;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use account::{AccountEndpoints, AccountLookup, Credentials};
pub use cookies::CookieJar;
pub use error::LookupError;
pub use public::PublicLookup;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    Available,
    Taken,
    Reserved,
    /// Status string the checker returned that we do not recognise.
    Unknown(String),
}

impl Availability {
    pub fn from_status(status: &str) -> Self {
        match status {
            "available" => Self::Available,
            "taken" => Self::Taken,
            "reserved" => Self::Reserved,
            other => Self::Unknown(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsernameStatus {
    pub availability: Availability,
    /// The answer came from the checker's cache rather than a live query.
    pub cached: bool,
}

#[async_trait]
pub trait UsernameLookup: Send + Sync {
    async fn check(&self, username: &str) -> Result<UsernameStatus, LookupError>;
}
