//! In-process transport built on tokio channels.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::error::{Error, Result};

use super::{InboundMessage, MessageSender, OutboundMessage};

/// Create the inbound side of an in-process queue
///
/// The stream is what [`crate::ReportService::start_consumer`] reads; it ends once every
/// sender is dropped.
pub fn inbound_channel(
    capacity: usize,
) -> (mpsc::Sender<InboundMessage>, ReceiverStream<InboundMessage>) {
    let (tx, rx) = mpsc::channel(capacity);
    (tx, ReceiverStream::new(rx))
}

/// [`MessageSender`] delivering into a tokio channel
#[derive(Clone)]
pub struct ChannelSender {
    tx: mpsc::Sender<OutboundMessage>,
}

impl ChannelSender {
    /// Create a sender and the receiver outbound messages arrive on
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<OutboundMessage>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl MessageSender for ChannelSender {
    async fn send(&self, message: OutboundMessage) -> Result<()> {
        self.tx
            .send(message)
            .await
            .map_err(|e| Error::Transport(format!("outbound channel closed: {}", e)))
    }
}
