use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of a Mattermost websocket event. Only `Posted` carries a new message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Posted,
    PostEdited,
    PostDeleted,
    Typing,
    Hello,
    StatusChange,
    #[serde(other)]
    Other,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EventKind::Posted => "posted",
            EventKind::PostEdited => "post_edited",
            EventKind::PostDeleted => "post_deleted",
            EventKind::Typing => "typing",
            EventKind::Hello => "hello",
            EventKind::StatusChange => "status_change",
            EventKind::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// A chat post as serialized inside `data.post` of a `posted` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub channel_id: String,
    pub user_id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub root_id: String,
}

/// An inbound platform event, normalized from the websocket frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingEvent {
    pub kind: EventKind,
    pub channel_id: String,
    /// Author of the event. For `posted` events this is the post author.
    pub author_id: String,
    pub post: Option<Post>,
    pub seq: Option<i64>,
}

/// A message to post in a channel, optionally threaded under `root_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub channel_id: String,
    pub content: String,
    pub root_id: Option<String>,
}

impl OutboundMessage {
    pub fn new(channel_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            content: content.into(),
            root_id: None,
        }
    }

    /// Thread the message under an existing post.
    pub fn in_reply_to(mut self, post_id: impl Into<String>) -> Self {
        self.root_id = Some(post_id.into());
        self
    }
}

/// Receipt confirming a message was delivered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    pub channel_id: String,
    pub post_id: Option<String>,
    pub delivered_at: DateTime<Utc>,
    pub success: bool,
    pub error: Option<String>,
}

/// A team membership record as far as authorization cares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub user_id: String,
    pub is_admin: bool,
}

/// A structured interaction log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionLog {
    pub ts: DateTime<Utc>,
    pub user: String,
    pub channel: String,
    pub post: String,
    /// Stable id of the rule that fired, if any.
    pub rule: Option<u64>,
    pub action: InteractionAction,
    pub success: bool,
    pub duration_ms: Option<u64>,
    pub error: Option<String>,
}

/// Types of interaction actions logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionAction {
    Reply,
    Admin,
    NoMatch,
}
