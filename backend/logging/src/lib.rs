//! Structured logging for Clove.
//!
//! Console output, optional daily JSON log files, and secret scrubbing for
//! strings that may carry credentials.

pub mod logger;
pub mod redact;

pub use logger::{LogGuard, init_logger};
pub use redact::redact_secrets;
