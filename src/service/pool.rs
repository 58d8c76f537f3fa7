//! Bounded worker pool.
//!
//! Every job is spawned immediately and then waits for a semaphore permit, so submitting
//! never blocks. Jobs waiting for a permit form the (unbounded) queue in front of the pool;
//! tokio's semaphore is fair, so they start in submission order.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio_util::task::TaskTracker;

#[derive(Clone)]
pub(crate) struct WorkerPool {
    limit: Arc<Semaphore>,
    tracker: TaskTracker,
    size: usize,
}

impl WorkerPool {
    pub(crate) fn new(size: usize) -> Self {
        Self {
            limit: Arc::new(Semaphore::new(size)),
            tracker: TaskTracker::new(),
            size,
        }
    }

    /// Run `job` once a worker is free
    pub(crate) fn submit<F>(&self, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let limit = self.limit.clone();
        self.tracker.spawn(async move {
            let _permit = match limit.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    tracing::error!("Worker pool closed, dropping job");
                    return;
                }
            };
            job.await;
        });
    }

    /// Jobs submitted and not yet finished
    pub(crate) fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Jobs currently holding a worker
    pub(crate) fn busy(&self) -> usize {
        self.size - self.limit.available_permits()
    }

    /// Wait until every submitted job has finished
    pub(crate) async fn wait_idle(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }
}
