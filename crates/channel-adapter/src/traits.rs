use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::ChannelAdapterError;
use crate::types::{DeliveryReceipt, IncomingEvent, OutboundMessage, TeamMember};

/// Core trait for the chat platform collaborator.
///
/// The responder only talks to the platform through this trait: it receives
/// events from the queue fed by `start`, posts replies, and looks up team
/// membership for admin checks.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// Start the event stream, pushing every decoded event into `events`.
    async fn start(&self, events: mpsc::Sender<IncomingEvent>) -> Result<(), ChannelAdapterError>;

    /// Close the event stream. Returns `NotRunning` if it was never started
    /// or has already been stopped.
    async fn stop(&self) -> Result<(), ChannelAdapterError>;

    /// Post a message, optionally threaded.
    async fn send_message(
        &self,
        message: OutboundMessage,
    ) -> Result<DeliveryReceipt, ChannelAdapterError>;

    /// Membership list of a team.
    async fn list_team_members(
        &self,
        team_id: &str,
    ) -> Result<Vec<TeamMember>, ChannelAdapterError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct MockAdapter {
        sent: Mutex<Vec<OutboundMessage>>,
    }

    #[async_trait]
    impl ChannelAdapter for MockAdapter {
        async fn start(
            &self,
            _events: mpsc::Sender<IncomingEvent>,
        ) -> Result<(), ChannelAdapterError> {
            Ok(())
        }
        async fn stop(&self) -> Result<(), ChannelAdapterError> {
            Ok(())
        }
        async fn send_message(
            &self,
            message: OutboundMessage,
        ) -> Result<DeliveryReceipt, ChannelAdapterError> {
            let channel_id = message.channel_id.clone();
            self.sent.lock().unwrap().push(message);
            Ok(DeliveryReceipt {
                channel_id,
                post_id: Some("post-9".to_string()),
                delivered_at: chrono::Utc::now(),
                success: true,
                error: None,
            })
        }
        async fn list_team_members(
            &self,
            _team_id: &str,
        ) -> Result<Vec<TeamMember>, ChannelAdapterError> {
            Ok(vec![TeamMember {
                user_id: "u1".to_string(),
                is_admin: true,
            }])
        }
    }

    #[tokio::test]
    async fn mock_adapter_through_trait_object() {
        let adapter: Box<dyn ChannelAdapter> = Box::new(MockAdapter {
            sent: Mutex::new(Vec::new()),
        });
        let (tx, _rx) = mpsc::channel(1);
        assert!(adapter.start(tx).await.is_ok());
        let receipt = adapter
            .send_message(OutboundMessage::new("c1", "hello").in_reply_to("p1"))
            .await
            .unwrap();
        assert!(receipt.success);
        let members = adapter.list_team_members("t1").await.unwrap();
        assert!(members[0].is_admin);
        assert!(adapter.stop().await.is_ok());
    }
}
