//! Queue-facing message types and transports.
//!
//! - [`publisher`] - ordered, fire-and-forget status publishing
//! - [`channel`] - in-process transport built on tokio channels
//!
//! Wire framing and broker connections live behind [`MessageSender`] and the inbound
//! `Stream` the consumer reads from; this crate only ships the in-process transport.

mod channel;
mod publisher;


pub use channel::{ChannelSender, inbound_channel};
pub use publisher::StatusPublisher;

use async_trait::async_trait;

use crate::types::RequestId;

/// Raw message delivered by the inbound queue
#[derive(Clone, Debug, Default)]
pub struct InboundMessage {
    /// JSON encoded list of report requests
    pub body: Vec<u8>,
    /// Value of the `format` selector property
    pub format: Option<String>,
    /// Destination status replies should go to
    pub reply_to: Option<String>,
    /// Correlation id set by the submitter on the batch message
    pub correlation_id: Option<String>,
}

impl InboundMessage {
    /// Create a message with the given body and no properties
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            ..Default::default()
        }
    }

    /// Set the format selector property
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Set the reply destination
    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    /// Set the batch correlation id
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }
}

/// Where a status message goes and how the submitter matches it to its request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplyAddress {
    /// Destination queue
    pub destination: String,
    /// Correlation id, the originating request's id
    pub correlation_id: String,
}

impl ReplyAddress {
    /// Address replies for `id` to `destination`
    pub fn for_request(destination: impl Into<String>, id: &RequestId) -> Self {
        Self {
            destination: destination.into(),
            correlation_id: id.as_str().to_string(),
        }
    }
}

/// Encoded message ready for the outbound transport
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Destination queue
    pub destination: String,
    /// Correlation id
    pub correlation_id: String,
    /// JSON encoded [`crate::types::StatusMessage`]
    pub body: Vec<u8>,
}

/// Abstraction over the outbound queue transport
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Hand `message` to the transport
    async fn send(&self, message: OutboundMessage) -> crate::Result<()>;
}
