//! Mattermost channel adapter: REST session plus websocket event stream.
//!
//! Receives events over the v4 websocket, sends replies and looks up team
//! membership via the REST API with the session token.

pub mod api;
pub mod events;
pub mod session;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch, RwLock};
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};

use crate::error::ChannelAdapterError;
use crate::traits::ChannelAdapter;
use crate::types::{DeliveryReceipt, IncomingEvent, OutboundMessage, TeamMember};

use api::MattermostApiClient;
use session::Session;

/// Bidirectional Mattermost adapter.
///
/// `start` opens the websocket and spawns a reader task feeding the event
/// queue; `stop` signals that task to close the connection.
pub struct MattermostAdapter {
    api_client: MattermostApiClient,
    websocket_url: String,
    token: String,
    shutdown_tx: RwLock<Option<watch::Sender<()>>>,
}

impl MattermostAdapter {
    pub fn new(session: &Session, websocket_url: impl Into<String>) -> Self {
        Self {
            api_client: session.api.clone(),
            websocket_url: websocket_url.into(),
            token: session.token.clone(),
            shutdown_tx: RwLock::new(None),
        }
    }

    pub async fn is_running(&self) -> bool {
        self.shutdown_tx.read().await.is_some()
    }
}

#[async_trait]
impl ChannelAdapter for MattermostAdapter {
    async fn start(&self, queue: mpsc::Sender<IncomingEvent>) -> Result<(), ChannelAdapterError> {
        let mut guard = self.shutdown_tx.write().await;
        if guard.is_some() {
            return Err(ChannelAdapterError::AlreadyRunning);
        }

        let (stream, _response) = connect_async(self.websocket_url.as_str())
            .await
            .map_err(|e| ChannelAdapterError::Connection(format!("websocket connect failed: {}", e)))?;
        let (mut sink, mut source) = stream.split();

        let challenge = serde_json::to_string(&events::authentication_challenge(1, &self.token))
            .map_err(|e| ChannelAdapterError::Internal(format!("challenge encode: {}", e)))?;
        sink.send(WsMessage::Text(challenge))
            .await
            .map_err(|e| ChannelAdapterError::Connection(format!("websocket auth failed: {}", e)))?;

        let (shutdown_tx, mut shutdown_rx) = watch::channel(());
        *guard = Some(shutdown_tx);

        let url = self.websocket_url.clone();
        tokio::spawn(async move {
            tracing::info!(url = %url, "Listening on Mattermost websocket");
            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => {
                        let _ = sink.send(WsMessage::Close(None)).await;
                        break;
                    }
                    frame = source.next() => match frame {
                        Some(Ok(WsMessage::Text(text))) => match events::parse_frame(&text) {
                            Ok(Some(event)) => {
                                if queue.send(event).await.is_err() {
                                    tracing::debug!("Event queue closed, leaving websocket loop");
                                    break;
                                }
                            }
                            Ok(None) => {}
                            Err(e) => tracing::debug!(error = %e, "Skipping undecodable websocket frame"),
                        },
                        Some(Ok(WsMessage::Close(_))) | None => {
                            tracing::warn!("Mattermost websocket closed by server");
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::error!(error = %e, "Mattermost websocket read failed");
                            break;
                        }
                    }
                }
            }
            // Dropping `queue` here closes the queue for the consumer.
        });

        Ok(())
    }

    async fn stop(&self) -> Result<(), ChannelAdapterError> {
        match self.shutdown_tx.write().await.take() {
            Some(tx) => {
                let _ = tx.send(());
                tracing::info!("Mattermost event stream stopped");
                Ok(())
            }
            None => Err(ChannelAdapterError::NotRunning),
        }
    }

    async fn send_message(
        &self,
        message: OutboundMessage,
    ) -> Result<DeliveryReceipt, ChannelAdapterError> {
        self.api_client.create_post(&message).await
    }

    async fn list_team_members(
        &self,
        team_id: &str,
    ) -> Result<Vec<TeamMember>, ChannelAdapterError> {
        self.api_client.get_team_members(team_id).await
    }
}
