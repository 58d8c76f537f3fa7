//! Request pipeline: generate, upload and notify for a single request.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::error::Result;
use crate::messaging::{ReplyAddress, StatusPublisher};
use crate::report::ReportBuilder;
use crate::storage::ArtifactStore;
use crate::types::{Event, ReportRequest};

/// Stage functions every pipeline runs through (cheap to clone)
#[derive(Clone)]
pub struct RequestPipeline {
    builder: Arc<ReportBuilder>,
    store: Arc<dyn ArtifactStore>,
    publisher: StatusPublisher,
    event_tx: broadcast::Sender<Event>,
}

impl RequestPipeline {
    /// Assemble a pipeline from its collaborators
    pub fn new(
        builder: Arc<ReportBuilder>,
        store: Arc<dyn ArtifactStore>,
        publisher: StatusPublisher,
        event_tx: broadcast::Sender<Event>,
    ) -> Self {
        Self {
            builder,
            store,
            publisher,
            event_tx,
        }
    }

    /// Run all stages for `request`, stopping at the first failure
    ///
    /// Stages:
    /// 1. Mark in progress and publish, before any work starts
    /// 2. Generate the workbook
    /// 3. Upload it, keyed by request id
    /// 4. Mark generated with the artifact URL and publish
    ///
    /// A failure after stage 1 leaves the submitter's last seen status at `InProgress`;
    /// nothing is published for it.
    pub async fn run(&self, mut request: ReportRequest, reply: &ReplyAddress) -> Result<String> {
        request.mark_in_progress()?;
        self.publisher.publish(request.status_message(), reply);

        let bytes = self.builder.generate(&request).await?;

        let url = self.store.upload(bytes, &request.id).await?;

        request.mark_generated(url.clone())?;
        self.publisher.publish(request.status_message(), reply);

        Ok(url)
    }

    pub(crate) fn close_publisher(&self) {
        self.publisher.close();
    }

    /// Run the pipeline as a detached unit of work
    ///
    /// Failures are escalated here: logged at error level and broadcast as
    /// [`Event::PipelineFailed`]. They are not retried and never affect other requests.
    pub(crate) async fn execute(self, request: ReportRequest, reply: ReplyAddress) {
        let id = request.id.clone();
        self.event_tx
            .send(Event::PipelineStarted { id: id.clone() })
            .ok();

        match self.run(request, &reply).await {
            Ok(url) => {
                tracing::info!(request_id = %id, url = %url, "Report generated");
                self.event_tx
                    .send(Event::PipelineCompleted { id, url })
                    .ok();
            }
            Err(e) => {
                tracing::error!(
                    request_id = %id,
                    upstream = e.is_upstream(),
                    error = %e,
                    "Error processing report request"
                );
                self.event_tx
                    .send(Event::PipelineFailed {
                        id,
                        error: e.to_string(),
                    })
                    .ok();
            }
        }
    }
}
