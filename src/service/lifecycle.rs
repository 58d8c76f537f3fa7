//! Shutdown coordination.

use std::sync::atomic::Ordering;

use crate::error::Result;
use crate::types::Event;

use super::ReportService;

impl ReportService {
    /// Gracefully shut down the service
    ///
    /// 1. Stops accepting new batches and stops consumer loops
    /// 2. Waits for in-flight pipelines, up to `worker.shutdown_timeout`
    /// 3. Flushes queued status messages and stops the publisher
    /// 4. Emits [`Event::Shutdown`]
    ///
    /// Calling it again is harmless.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating graceful shutdown");

        self.lifecycle.accepting_new.store(false, Ordering::SeqCst);
        self.lifecycle.shutdown_token.cancel();
        tracing::info!("Stopped accepting new report requests");

        let shutdown_timeout = self.config.worker.shutdown_timeout;
        match tokio::time::timeout(shutdown_timeout, self.pool.wait_idle()).await {
            Ok(()) => tracing::info!("All report pipelines completed"),
            Err(_) => tracing::warn!(
                remaining = self.pool.in_flight(),
                "Timeout waiting for report pipelines, proceeding with shutdown"
            ),
        }

        self.pipeline.close_publisher();
        if let Some(handle) = self.lifecycle.publisher_handle.lock().await.take()
            && let Err(e) = handle.await
        {
            tracing::error!(error = %e, "Status publisher task failed");
        }

        self.event_tx.send(Event::Shutdown).ok();
        tracing::info!("Shutdown complete");
        Ok(())
    }
}
