//! `clove-front` — the remote front-management API.
//!
//! The remote side owns all member and fronter state. Nothing here caches it:
//! every call goes over the wire and the answer is the current truth.

pub mod client;
pub mod error;
pub mod mock;
pub mod types;

pub use client::{FrontApi, FrontClient, FrontClientConfig};
pub use error::FrontApiError;
pub use types::{Fronters, Health, Member, SwitchResult, TokenRotation};
