//! Subcommand and context-menu handlers.

pub mod canned;
pub mod dough;
pub mod hytale;
pub mod utils;

pub use canned::{CannedReply, Greeting};
pub use dough::{AddHandler, HealthHandler, LockoutHandler, RemoveHandler};
pub use hytale::UsercheckHandler;
pub use utils::{HelpHandler, InviteHandler, PingHandler, UserIdHandler};
