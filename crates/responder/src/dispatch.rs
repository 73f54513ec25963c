//! Event dispatch: filter inbound events, run the rule engine, reply.
//!
//! `Responder` is the single owner of the rule table. All matching and all
//! mutation happen on whichever task drives it, one event at a time.

use std::sync::Arc;
use std::time::Instant;

use yakabot_channel_adapter::{
    ChannelAdapter, EventKind, IncomingEvent, InteractionAction, InteractionLogger,
    OutboundMessage, Post,
};

use crate::auth::TeamAuthorizer;
use crate::commands::{AdminCommands, NOT_ADMIN};
use crate::engine::first_match;
use crate::error::Result;
use crate::rule::{Response, RuleId};
use crate::table::RuleTable;

pub const DEFAULT_FALLBACK: &str = "I did not understand you!";

/// What to do when no rule fires.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NoMatchPolicy {
    #[default]
    Silent,
    Reply(String),
}

/// Identity of the bot within the platform.
#[derive(Debug, Clone)]
pub struct ResponderConfig {
    pub bot_user_id: String,
    pub team_id: String,
    /// The single monitored channel.
    pub channel_id: String,
    pub full_name: String,
    pub no_match: NoMatchPolicy,
}

/// Outcome of running the engine on one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub rule: Option<RuleId>,
    pub action: InteractionAction,
}

pub struct Responder {
    pub(crate) config: ResponderConfig,
    table: RuleTable,
    commands: AdminCommands,
    pub(crate) adapter: Arc<dyn ChannelAdapter>,
    authorizer: TeamAuthorizer,
    logger: Arc<InteractionLogger>,
}

impl Responder {
    pub fn new(
        config: ResponderConfig,
        table: RuleTable,
        adapter: Arc<dyn ChannelAdapter>,
        logger: Arc<InteractionLogger>,
    ) -> Result<Self> {
        let authorizer = TeamAuthorizer::new(adapter.clone(), config.team_id.clone());
        Ok(Self {
            config,
            table,
            commands: AdminCommands::new()?,
            adapter,
            authorizer,
            logger,
        })
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// The three gates, in order: monitored channel, posted kind, not ourselves.
    pub fn accepts(&self, event: &IncomingEvent) -> bool {
        event.channel_id == self.config.channel_id
            && event.kind == EventKind::Posted
            && event.author_id != self.config.bot_user_id
    }

    /// Process one inbound event to completion, including the reply send.
    pub async fn handle_event(&mut self, event: IncomingEvent) {
        if !self.accepts(&event) {
            return;
        }
        let Some(post) = event.post else {
            tracing::debug!(seq = ?event.seq, "Posted event without a post body");
            return;
        };

        let started = Instant::now();
        tracing::debug!(post = %post.id, user = %event.author_id, "Responding to monitored channel message");

        let Some(reply) = self.respond(&event.author_id, &post.message).await else {
            let entry = InteractionLogger::entry(
                &event.author_id,
                &post.channel_id,
                &post.id,
                None,
                InteractionAction::NoMatch,
                true,
                Some(started.elapsed().as_millis() as u64),
                None,
            );
            self.logger.log(&entry).await;
            return;
        };

        let error = self.send_reply(&post, reply.text).await;
        let entry = InteractionLogger::entry(
            &event.author_id,
            &post.channel_id,
            &post.id,
            reply.rule.map(|id| id.0),
            reply.action,
            error.is_none(),
            Some(started.elapsed().as_millis() as u64),
            error,
        );
        self.logger.log(&entry).await;
    }

    /// Match `text` and produce the reply, if any. May mutate the table.
    pub async fn respond(&mut self, user_id: &str, text: &str) -> Option<Reply> {
        let fired = first_match(&self.table, text).map(|m| (m.rule.id(), m.rule.response().clone()));

        let Some((rule, response)) = fired else {
            return match self.config.no_match {
                NoMatchPolicy::Silent => None,
                NoMatchPolicy::Reply(ref fallback) => Some(Reply {
                    text: fallback.clone(),
                    rule: None,
                    action: InteractionAction::NoMatch,
                }),
            };
        };

        let (text, action) = match response {
            Response::Static(answer) => (answer, InteractionAction::Reply),
            Response::Builtin(builtin) => {
                let text = if builtin.mutates() && !self.authorizer.is_admin(user_id).await {
                    tracing::info!(user = %user_id, command = builtin.command(), "Refused admin command");
                    NOT_ADMIN.to_string()
                } else {
                    self.commands.execute(builtin, &mut self.table, text)
                };
                (text, InteractionAction::Admin)
            }
        };

        Some(Reply {
            text,
            rule: Some(rule),
            action,
        })
    }

    /// Thread a reply under `post`. Failures are logged and returned, never retried.
    async fn send_reply(&self, post: &Post, text: String) -> Option<String> {
        let message = OutboundMessage::new(&self.config.channel_id, text).in_reply_to(&post.id);
        self.post(message).await
    }

    /// Fire-and-forget post; returns the failure text if there was one.
    pub(crate) async fn post(&self, message: OutboundMessage) -> Option<String> {
        match self.adapter.send_message(message).await {
            Ok(receipt) if receipt.success => None,
            Ok(receipt) => {
                let error = receipt.error.unwrap_or_else(|| "unknown delivery failure".to_string());
                tracing::error!(channel = %receipt.channel_id, error = %error, "We failed to send a message");
                Some(error)
            }
            Err(e) => {
                tracing::error!(error = %e, "We failed to send a message");
                Some(e.to_string())
            }
        }
    }
}
