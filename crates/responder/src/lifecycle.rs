//! Startup announcement, the actor loop and the shutdown sequence.
//!
//! The loop is the only place events and the shutdown trigger are observed,
//! so shutdown never interleaves with an event that is being processed.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;
use yakabot_channel_adapter::{ChannelAdapterError, IncomingEvent, OutboundMessage};

use crate::dispatch::Responder;

/// Why the actor loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The shutdown trigger fired.
    Interrupted,
    /// The event stream closed on its own.
    StreamClosed,
}

/// How the startup phase ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Startup {
    /// The event stream is open; hand the queue to [`Responder::run`].
    Ready,
    /// The shutdown trigger fired first. The farewell has been posted.
    Interrupted,
}

impl Responder {
    /// Announce the start and open the event stream, racing both against `shutdown`.
    ///
    /// An interrupt or a failed connect still ends with the farewell, so callers
    /// should poll `shutdown` from here on rather than installing it later.
    pub async fn start<S>(
        &self,
        queue: mpsc::Sender<IncomingEvent>,
        shutdown: Pin<&mut S>,
    ) -> Result<Startup, ChannelAdapterError>
    where
        S: Future<Output = ()>,
    {
        let started = tokio::select! {
            biased;
            _ = shutdown => None,
            result = async {
                self.announce_start().await;
                self.adapter.start(queue).await
            } => Some(result),
        };

        match started {
            None => {
                tracing::info!("Interrupted during startup");
                self.shutdown().await;
                Ok(Startup::Interrupted)
            }
            Some(Err(e)) => {
                self.shutdown().await;
                Err(e)
            }
            Some(Ok(())) => Ok(Startup::Ready),
        }
    }

    pub async fn announce_start(&self) {
        let text = format!("_{} has **started** running_", self.config.full_name);
        self.post(OutboundMessage::new(&self.config.channel_id, text))
            .await;
    }

    /// Consume events until `shutdown` resolves or the queue closes, then shut down.
    pub async fn run<S>(mut self, mut queue: mpsc::Receiver<IncomingEvent>, shutdown: S) -> StopReason
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let reason = loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break StopReason::Interrupted,
                event = queue.recv() => match event {
                    Some(event) => self.handle_event(event).await,
                    None => break StopReason::StreamClosed,
                },
            }
        };

        tracing::info!(reason = ?reason, "Responder loop stopped");
        queue.close();
        self.shutdown().await;
        reason
    }

    /// Close the event stream, then say goodbye in the monitored channel.
    pub async fn shutdown(&self) {
        match self.adapter.stop().await {
            Ok(()) | Err(ChannelAdapterError::NotRunning) => {}
            Err(e) => tracing::warn!(error = %e, "Event stream did not stop cleanly"),
        }

        let text = format!("_{} has **stopped** running_", self.config.full_name);
        self.post(OutboundMessage::new(&self.config.channel_id, text))
            .await;
    }
}
