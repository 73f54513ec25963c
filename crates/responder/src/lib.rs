//! Rule engine and event dispatch loop for the Yakafokon chat responder.
//!
//! Incoming messages from the monitored channel are matched against an
//! ordered table of regular-expression rules; the first rule that matches
//! answers, either with a fixed text or by running one of the built-in
//! commands that let team administrators edit the table from the chat.

pub mod auth;
pub mod commands;
pub mod defaults;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod rule;
pub mod table;

pub use auth::TeamAuthorizer;
pub use commands::{AdminCommands, ADD_USAGE, NOT_ADMIN};
pub use defaults::{initial_table, BotNames};
pub use dispatch::{NoMatchPolicy, Reply, Responder, ResponderConfig, DEFAULT_FALLBACK};
pub use engine::{first_match, Match};
pub use error::RuleError;
pub use lifecycle::{Startup, StopReason};
pub use rule::{Builtin, Response, Rule, RuleId};
pub use table::RuleTable;
