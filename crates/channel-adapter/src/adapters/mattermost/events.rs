//! Mattermost websocket frame parsing.
//!
//! Decodes websocket text frames into normalized `IncomingEvent`s. The post of
//! a `posted` event travels as a JSON string inside `data.post`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ChannelAdapterError;
use crate::types::{EventKind, IncomingEvent, Post};

/// Raw websocket frame. Replies to our own actions carry `status`/`seq_reply`
/// instead of `event`.
#[derive(Debug, Clone, Deserialize)]
struct WebSocketFrame {
    event: Option<EventKind>,
    #[serde(default)]
    data: serde_json::Map<String, Value>,
    #[serde(default)]
    broadcast: Broadcast,
    seq: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Broadcast {
    #[serde(default)]
    user_id: String,
    #[serde(default)]
    channel_id: String,
}

/// An action sent from the client to the server.
#[derive(Debug, Serialize)]
pub struct WebSocketAction {
    pub seq: i64,
    pub action: &'static str,
    pub data: Value,
}

/// Build the first frame of a session: authenticate with the session token.
pub fn authentication_challenge(seq: i64, token: &str) -> WebSocketAction {
    WebSocketAction {
        seq,
        action: "authentication_challenge",
        data: serde_json::json!({ "token": token }),
    }
}

/// Parse a text frame. Returns `Ok(None)` for frames that are not events.
pub fn parse_frame(text: &str) -> Result<Option<IncomingEvent>, ChannelAdapterError> {
    let frame: WebSocketFrame = serde_json::from_str(text)
        .map_err(|e| ChannelAdapterError::ParseError(format!("websocket frame: {}", e)))?;

    let Some(kind) = frame.event else {
        return Ok(None);
    };

    let post = match frame.data.get("post") {
        Some(Value::String(raw)) => Some(parse_post(raw)?),
        _ => None,
    };

    let data_str = |key: &str| {
        frame
            .data
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let channel_id = first_non_empty([
        frame.broadcast.channel_id.clone(),
        post.as_ref().map(|p| p.channel_id.clone()).unwrap_or_default(),
        data_str("channel_id"),
    ]);
    let author_id = first_non_empty([
        post.as_ref().map(|p| p.user_id.clone()).unwrap_or_default(),
        data_str("user_id"),
        frame.broadcast.user_id.clone(),
    ]);

    Ok(Some(IncomingEvent {
        kind,
        channel_id,
        author_id,
        post,
        seq: frame.seq,
    }))
}

/// Decode the serialized post embedded in a `posted` event.
pub fn parse_post(raw: &str) -> Result<Post, ChannelAdapterError> {
    serde_json::from_str(raw)
        .map_err(|e| ChannelAdapterError::ParseError(format!("embedded post: {}", e)))
}

fn first_non_empty<const N: usize>(candidates: [String; N]) -> String {
    candidates
        .into_iter()
        .find(|c| !c.is_empty())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posted_frame(channel: &str, author: &str, message: &str) -> String {
        let post = serde_json::json!({
            "id": "post-1",
            "channel_id": channel,
            "user_id": author,
            "message": message,
        });
        serde_json::json!({
            "event": "posted",
            "data": {
                "channel_display_name": "Debugging",
                "post": post.to_string(),
                "sender_name": "alice",
            },
            "broadcast": {
                "omit_users": null,
                "user_id": "",
                "channel_id": channel,
                "team_id": "",
            },
            "seq": 7,
        })
        .to_string()
    }

    #[test]
    fn parse_posted_event() {
        let event = parse_frame(&posted_frame("ch-1", "user-1", "well hello there"))
            .unwrap()
            .unwrap();
        assert_eq!(event.kind, EventKind::Posted);
        assert_eq!(event.channel_id, "ch-1");
        assert_eq!(event.author_id, "user-1");
        assert_eq!(event.seq, Some(7));
        let post = event.post.unwrap();
        assert_eq!(post.id, "post-1");
        assert_eq!(post.message, "well hello there");
    }

    #[test]
    fn parse_typing_event() {
        let frame = r#"{
            "event": "typing",
            "data": {"parent_id": "", "user_id": "user-2"},
            "broadcast": {"channel_id": "ch-1", "user_id": ""},
            "seq": 3
        }"#;
        let event = parse_frame(frame).unwrap().unwrap();
        assert_eq!(event.kind, EventKind::Typing);
        assert_eq!(event.author_id, "user-2");
        assert!(event.post.is_none());
    }

    #[test]
    fn status_reply_is_not_an_event() {
        let frame = r#"{"status":"OK","seq_reply":1}"#;
        assert!(parse_frame(frame).unwrap().is_none());
    }

    #[test]
    fn garbage_frame_is_a_parse_error() {
        assert!(matches!(
            parse_frame("not json"),
            Err(ChannelAdapterError::ParseError(_))
        ));
    }

    #[test]
    fn malformed_embedded_post_is_a_parse_error() {
        let frame = r#"{"event":"posted","data":{"post":"{oops"},"broadcast":{},"seq":1}"#;
        assert!(parse_frame(frame).is_err());
    }

    #[test]
    fn challenge_frame_shape() {
        let action = authentication_challenge(1, "tok-123");
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["action"], "authentication_challenge");
        assert_eq!(json["data"]["token"], "tok-123");
        assert_eq!(json["seq"], 1);
    }
}
