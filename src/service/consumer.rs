//! Inbound message handling.

use futures::{Stream, StreamExt};
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::messaging::InboundMessage;
use crate::types::{Event, ReportRequest};

use super::ReportService;

impl ReportService {
    /// Decode one inbound message and dispatch its requests
    ///
    /// Messages whose format property does not match the configured selector are not for
    /// this worker and are skipped (`Ok(0)`).
    ///
    /// # Errors
    ///
    /// - [`Error::Decode`] if the body is not a JSON list of report requests
    /// - [`Error::ShuttingDown`] once shutdown has started
    pub fn handle_message(&self, message: InboundMessage) -> Result<usize> {
        let selector = &self.config.broker.format_selector;
        let matches = message
            .format
            .as_deref()
            .is_some_and(|format| format.eq_ignore_ascii_case(selector));
        if !matches {
            tracing::debug!(
                format = ?message.format,
                selector = %selector,
                "Skipping message for another format"
            );
            return Ok(0);
        }

        if let Some(correlation_id) = &message.correlation_id {
            tracing::debug!(correlation_id = %correlation_id, "Received report batch message");
        }

        let batch: Vec<ReportRequest> = match serde_json::from_slice(&message.body) {
            Ok(batch) => batch,
            Err(e) => {
                tracing::warn!(error = %e, "Rejecting undecodable report batch");
                self.event_tx
                    .send(Event::MessageRejected {
                        reason: e.to_string(),
                    })
                    .ok();
                return Err(Error::Decode(e));
            }
        };

        self.dispatch(batch, message.reply_to.as_deref())
    }

    /// Consume `messages` until the stream ends or shutdown starts
    ///
    /// Each message is handled with [`ReportService::handle_message`]; a bad message is
    /// logged and the loop moves on to the next one.
    pub fn start_consumer<S>(&self, mut messages: S) -> JoinHandle<()>
    where
        S: Stream<Item = InboundMessage> + Send + Unpin + 'static,
    {
        let service = self.clone();
        let shutdown_token = self.lifecycle.shutdown_token.clone();
        let queue = self.config.broker.inbound_queue.clone();

        tokio::spawn(async move {
            tracing::info!(queue = %queue, "Report consumer started");
            loop {
                let message = tokio::select! {
                    biased;
                    _ = shutdown_token.cancelled() => {
                        tracing::info!(queue = %queue, "Report consumer stopping");
                        break;
                    }
                    next = messages.next() => match next {
                        Some(message) => message,
                        None => {
                            tracing::info!(queue = %queue, "Inbound stream closed");
                            break;
                        }
                    },
                };

                match service.handle_message(message) {
                    Ok(_) => {}
                    Err(Error::ShuttingDown) => break,
                    Err(e) => {
                        tracing::debug!(error = %e, "Inbound message not dispatched");
                    }
                }
            }
        })
    }
}
