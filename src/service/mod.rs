//! Report service -- queue consumption and per-request pipelines.
//!
//! The `ReportService` struct and its methods are organized by concern:
//! - [`pool`] - Bounded worker pool shared by all pipelines
//! - [`pipeline`] - generate → upload → notify chain for one request
//! - [`dispatcher`] - Fan-out of a decoded batch onto the pool
//! - [`consumer`] - Inbound message loop (format filter, decode, dispatch)
//! - [`lifecycle`] - Shutdown coordination

mod consumer;
mod dispatcher;
mod lifecycle;
mod pipeline;
mod pool;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use pipeline::RequestPipeline;

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::Result;
use crate::messaging::{MessageSender, StatusPublisher};
use crate::report::ReportBuilder;
use crate::source::{MovielandClient, ReportDataSource};
use crate::storage::{ArtifactStore, LocalArtifactStore};
use crate::types::Event;

use pool::WorkerPool;

/// Shutdown and admission state
#[derive(Clone)]
pub(crate) struct Lifecycle {
    /// Cleared once shutdown begins; dispatch refuses new batches afterwards
    pub(crate) accepting_new: Arc<AtomicBool>,
    /// Stops consumer loops
    pub(crate) shutdown_token: CancellationToken,
    /// Delivery task of the status publisher, taken on shutdown
    pub(crate) publisher_handle: Arc<Mutex<Option<JoinHandle<()>>>>,
}

/// Report worker instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct ReportService {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: broadcast::Sender<Event>,
    /// Bounded pool every pipeline runs on
    pub(crate) pool: WorkerPool,
    /// Stage functions shared by all pipelines
    pub(crate) pipeline: RequestPipeline,
    /// Shutdown and admission state
    pub(crate) lifecycle: Lifecycle,
}

impl ReportService {
    /// Create a service with the HTTP data source and the local artifact store
    ///
    /// Must be called from within a tokio runtime: the status publisher task is spawned here.
    pub fn new(config: Config, sender: Arc<dyn MessageSender>) -> Result<Self> {
        config.validate()?;
        let source: Arc<dyn ReportDataSource> = Arc::new(MovielandClient::new(&config.data_source)?);
        let store: Arc<dyn ArtifactStore> = Arc::new(LocalArtifactStore::new(&config.storage)?);
        Self::with_components(config, source, store, sender)
    }

    /// Create a service from explicit collaborators
    ///
    /// Must be called from within a tokio runtime: the status publisher task is spawned here.
    pub fn with_components(
        config: Config,
        source: Arc<dyn ReportDataSource>,
        store: Arc<dyn ArtifactStore>,
        sender: Arc<dyn MessageSender>,
    ) -> Result<Self> {
        config.validate()?;

        tracing::info!(
            broker = %config.broker.url,
            inbound_queue = %config.broker.inbound_queue,
            format = %config.broker.format_selector,
            pool_size = config.worker.pool_size,
            page_size = config.worker.page_size,
            "Starting report service"
        );

        // Buffer of 1000 events; slow subscribers see Lagged rather than blocking pipelines
        let (event_tx, _rx) = broadcast::channel(1000);

        let (publisher, publisher_handle) = StatusPublisher::start(sender, event_tx.clone());

        let builder = Arc::new(ReportBuilder::new(
            source,
            config.worker.page_size,
            config.report.date_format.clone(),
        ));

        let pipeline = RequestPipeline::new(builder, store, publisher, event_tx.clone());

        Ok(Self {
            pool: WorkerPool::new(config.worker.pool_size),
            config: Arc::new(config),
            event_tx,
            pipeline,
            lifecycle: Lifecycle {
                accepting_new: Arc::new(AtomicBool::new(true)),
                shutdown_token: CancellationToken::new(),
                publisher_handle: Arc::new(Mutex::new(Some(publisher_handle))),
            },
        })
    }

    /// Subscribe to service events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Pipelines submitted and not yet finished, including those waiting for a worker
    pub fn in_flight(&self) -> usize {
        self.pool.in_flight()
    }

    /// Pipelines currently holding a worker
    pub fn busy_workers(&self) -> usize {
        self.pool.busy()
    }
}
