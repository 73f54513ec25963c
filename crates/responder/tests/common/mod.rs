#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{mpsc, Notify};
use yakabot_channel_adapter::{
    ChannelAdapter, ChannelAdapterError, DeliveryReceipt, EventKind, IncomingEvent,
    InteractionLogger, OutboundMessage, Post, TeamMember,
};
use yakabot_responder::{NoMatchPolicy, Responder, ResponderConfig, Response, RuleTable};

pub const BOT: &str = "bot-user";
pub const ADMIN: &str = "admin-user";
pub const MEMBER: &str = "plain-user";
pub const CHANNEL: &str = "chan-debug";
pub const TEAM: &str = "team-1";

/// Records everything the responder does against the platform.
#[derive(Default)]
pub struct RecordingAdapter {
    pub sent: Mutex<Vec<OutboundMessage>>,
    pub member_lookups: Mutex<usize>,
    pub stops: Mutex<usize>,
    pub members_unavailable: bool,
    pub fail_sends: bool,
    pub running: Mutex<bool>,
    /// Sends and stops in the order they reached the platform.
    pub journal: Mutex<Vec<String>>,
    /// When set, member lookups park until `lookup_release` is notified.
    pub gated_lookups: bool,
    pub lookup_entered: Notify,
    pub lookup_release: Notify,
    /// When set, `start` parks until `start_release` is notified.
    pub gated_start: bool,
    pub start_entered: Notify,
    pub start_release: Notify,
    pub fail_start: bool,
}

impl RecordingAdapter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            running: Mutex::new(true),
            ..Self::default()
        })
    }

    pub fn with_members_unavailable() -> Arc<Self> {
        Arc::new(Self {
            members_unavailable: true,
            running: Mutex::new(true),
            ..Self::default()
        })
    }

    pub fn with_failing_sends() -> Arc<Self> {
        Arc::new(Self {
            fail_sends: true,
            running: Mutex::new(true),
            ..Self::default()
        })
    }

    pub fn with_gated_lookups() -> Arc<Self> {
        Arc::new(Self {
            gated_lookups: true,
            running: Mutex::new(true),
            ..Self::default()
        })
    }

    pub fn with_gated_start() -> Arc<Self> {
        Arc::new(Self {
            gated_start: true,
            ..Self::default()
        })
    }

    pub fn with_failing_start() -> Arc<Self> {
        Arc::new(Self {
            fail_start: true,
            ..Self::default()
        })
    }

    pub fn journal(&self) -> Vec<String> {
        self.journal.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn lookups(&self) -> usize {
        *self.member_lookups.lock().unwrap()
    }

    pub fn stops(&self) -> usize {
        *self.stops.lock().unwrap()
    }
}

#[async_trait]
impl ChannelAdapter for RecordingAdapter {
    async fn start(&self, _queue: mpsc::Sender<IncomingEvent>) -> Result<(), ChannelAdapterError> {
        if self.gated_start {
            self.start_entered.notify_one();
            self.start_release.notified().await;
        }
        if self.fail_start {
            return Err(ChannelAdapterError::Connection("websocket refused".to_string()));
        }
        *self.running.lock().unwrap() = true;
        Ok(())
    }

    async fn stop(&self) -> Result<(), ChannelAdapterError> {
        *self.stops.lock().unwrap() += 1;
        self.journal.lock().unwrap().push("stop".to_string());
        let mut running = self.running.lock().unwrap();
        if !*running {
            return Err(ChannelAdapterError::NotRunning);
        }
        *running = false;
        Ok(())
    }

    async fn send_message(
        &self,
        message: OutboundMessage,
    ) -> Result<DeliveryReceipt, ChannelAdapterError> {
        let channel_id = message.channel_id.clone();
        self.journal
            .lock()
            .unwrap()
            .push(format!("send:{}", message.content));
        self.sent.lock().unwrap().push(message);
        if self.fail_sends {
            return Err(ChannelAdapterError::SendFailed("connection reset".to_string()));
        }
        Ok(DeliveryReceipt {
            channel_id,
            post_id: Some("reply-1".to_string()),
            delivered_at: chrono::Utc::now(),
            success: true,
            error: None,
        })
    }

    async fn list_team_members(
        &self,
        team_id: &str,
    ) -> Result<Vec<TeamMember>, ChannelAdapterError> {
        *self.member_lookups.lock().unwrap() += 1;
        if self.gated_lookups {
            self.lookup_entered.notify_one();
            self.lookup_release.notified().await;
        }
        if self.members_unavailable || team_id != TEAM {
            return Err(ChannelAdapterError::Connection("members lookup failed".to_string()));
        }
        Ok(vec![
            TeamMember {
                user_id: ADMIN.to_string(),
                is_admin: true,
            },
            TeamMember {
                user_id: MEMBER.to_string(),
                is_admin: false,
            },
        ])
    }
}

pub fn config(no_match: NoMatchPolicy) -> ResponderConfig {
    ResponderConfig {
        bot_user_id: BOT.to_string(),
        team_id: TEAM.to_string(),
        channel_id: CHANNEL.to_string(),
        full_name: "YakafokonBot".to_string(),
        no_match,
    }
}

/// Built-ins followed by `hello -> Hi`.
pub fn table() -> RuleTable {
    let mut table = RuleTable::with_builtins();
    table
        .push("hello", Response::Static("Hi".to_string()))
        .unwrap();
    table
}

pub fn responder(adapter: Arc<RecordingAdapter>, table: RuleTable) -> Responder {
    responder_with(adapter, table, NoMatchPolicy::Silent, Arc::new(InteractionLogger::new(None)))
}

pub fn responder_with(
    adapter: Arc<RecordingAdapter>,
    table: RuleTable,
    no_match: NoMatchPolicy,
    logger: Arc<InteractionLogger>,
) -> Responder {
    Responder::new(config(no_match), table, adapter, logger).unwrap()
}

pub fn posted(author: &str, message: &str) -> IncomingEvent {
    event(EventKind::Posted, CHANNEL, author, message)
}

pub fn event(kind: EventKind, channel: &str, author: &str, message: &str) -> IncomingEvent {
    IncomingEvent {
        kind,
        channel_id: channel.to_string(),
        author_id: author.to_string(),
        post: Some(Post {
            id: "post-42".to_string(),
            channel_id: channel.to_string(),
            user_id: author.to_string(),
            message: message.to_string(),
            root_id: String::new(),
        }),
        seq: Some(1),
    }
}
