//! Mattermost channel adapter for the Yakafokon responder bot.
//!
//! Covers everything the responder needs from the chat platform:
//! - session bootstrap (ping, login, profile sync, team and channel discovery)
//! - the websocket event stream, decoded into `IncomingEvent`s
//! - message posting and team membership lookups behind `ChannelAdapter`
//! - a structured interaction logger

pub mod config;
pub mod error;
pub mod logging;
pub mod traits;
pub mod types;

pub mod adapters;

pub use adapters::mattermost::session::Session;
pub use adapters::mattermost::MattermostAdapter;
pub use config::{Credentials, MattermostConfig};
pub use error::ChannelAdapterError;
pub use logging::InteractionLogger;
pub use traits::ChannelAdapter;
pub use types::{
    DeliveryReceipt, EventKind, IncomingEvent, InteractionAction, InteractionLog,
    OutboundMessage, Post, TeamMember,
};
