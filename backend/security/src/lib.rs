pub mod auth;

pub use auth::{AuthGate, AuthLevel, Denial};
