//! Command Handlers module
//!
//! Command handlers that orchestrate account operations.
//! Each handler coordinates the account aggregate, the stores and sessions.

mod commands;
mod mutation;
mod account_handler;
mod profile_handler;
mod journal_handler;


pub use commands::*;
pub use mutation::modify_account;
pub use account_handler::{CreateAccountHandler, LoginHandler};
pub use profile_handler::UpdateProfileHandler;
pub use journal_handler::JournalHandler;
