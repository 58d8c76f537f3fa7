//! Batch fan-out onto the worker pool.

use std::sync::atomic::Ordering;

use crate::error::{Error, Result};
use crate::messaging::ReplyAddress;
use crate::types::{Event, ReportRequest};

use super::ReportService;

impl ReportService {
    /// Submit one pipeline per request in `batch` and return without waiting for them
    ///
    /// Status replies go to `reply_to` when given, otherwise to the configured status queue.
    /// Returns the number of pipelines submitted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShuttingDown`] once [`ReportService::shutdown`] has started.
    pub fn dispatch(&self, batch: Vec<ReportRequest>, reply_to: Option<&str>) -> Result<usize> {
        if !self.lifecycle.accepting_new.load(Ordering::SeqCst) {
            return Err(Error::ShuttingDown);
        }

        let size = batch.len();
        let destination = reply_to.unwrap_or(&self.config.broker.status_queue);
        tracing::info!(
            size,
            destination = %destination,
            "Received batch of report requests"
        );
        self.event_tx.send(Event::BatchReceived { size }).ok();

        for request in batch {
            tracing::debug!(
                request_id = %request.id,
                report_type = %request.report_type,
                "Submitting report request"
            );
            let reply = ReplyAddress::for_request(destination, &request.id);
            let pipeline = self.pipeline.clone();
            self.pool.submit(pipeline.execute(request, reply));
        }

        Ok(size)
    }
}
