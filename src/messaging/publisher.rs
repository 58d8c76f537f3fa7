//! Status publishing.
//!
//! [`StatusPublisher::publish`] never waits on the transport. Messages are queued on an
//! unbounded channel and delivered by one background task in the order they were published,
//! so a pipeline's `InProgress` update always reaches the transport before its `Generated`
//! update.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::types::{Event, StatusMessage};

use super::{MessageSender, OutboundMessage, ReplyAddress};

enum Command {
    Publish {
        message: StatusMessage,
        reply: ReplyAddress,
    },
    Close,
}

/// Handle for publishing status updates (cheap to clone)
#[derive(Clone)]
pub struct StatusPublisher {
    tx: mpsc::UnboundedSender<Command>,
    event_tx: broadcast::Sender<Event>,
}

impl StatusPublisher {
    /// Spawn the delivery task and return a handle to it
    ///
    /// The task runs until [`StatusPublisher::close`] is called or every handle is dropped.
    pub fn start(
        sender: Arc<dyn MessageSender>,
        event_tx: broadcast::Sender<Event>,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(deliver(rx, sender, event_tx.clone()));
        (Self { tx, event_tx }, handle)
    }

    /// Queue `message` for delivery to `reply`
    ///
    /// Returns immediately. Delivery failures are logged and reported as
    /// [`Event::PublishFailed`]; they never reach the caller.
    pub fn publish(&self, message: StatusMessage, reply: &ReplyAddress) {
        let command = Command::Publish {
            message,
            reply: reply.clone(),
        };
        if let Err(mpsc::error::SendError(Command::Publish { message, .. })) = self.tx.send(command)
        {
            tracing::warn!(
                request_id = %message.request_id,
                status = ?message.report_status,
                "Status publisher stopped, dropping status message"
            );
            self.event_tx
                .send(Event::PublishFailed {
                    id: message.request_id,
                    error: "status publisher stopped".to_string(),
                })
                .ok();
        }
    }

    /// Stop the delivery task once everything queued so far has been delivered
    pub fn close(&self) {
        self.tx.send(Command::Close).ok();
    }
}

async fn deliver(
    mut rx: mpsc::UnboundedReceiver<Command>,
    sender: Arc<dyn MessageSender>,
    event_tx: broadcast::Sender<Event>,
) {
    while let Some(command) = rx.recv().await {
        let (message, reply) = match command {
            Command::Publish { message, reply } => (message, reply),
            Command::Close => break,
        };

        let id = message.request_id.clone();
        let status = message.report_status;

        let result = match serde_json::to_vec(&message) {
            Ok(body) => {
                sender
                    .send(OutboundMessage {
                        destination: reply.destination.clone(),
                        correlation_id: reply.correlation_id,
                        body,
                    })
                    .await
            }
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(()) => {
                tracing::debug!(
                    request_id = %id,
                    status = ?status,
                    destination = %reply.destination,
                    "Status message sent"
                );
                event_tx.send(Event::StatusPublished { id, status }).ok();
            }
            Err(e) => {
                tracing::warn!(request_id = %id, status = ?status, error = %e, "Failed to send status message");
                event_tx
                    .send(Event::PublishFailed {
                        id,
                        error: e.to_string(),
                    })
                    .ok();
            }
        }
    }

    tracing::debug!("Status publisher stopped");
}
