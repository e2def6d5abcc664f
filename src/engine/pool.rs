//! Bounded worker pool for bundle jobs
//!
//! One spawned task per job, with a shared semaphore capping how many
//! run at once. Permits are RAII guards acquired inside the task, so a
//! job holds its permit for exactly its own lifetime and releases it
//! even if the job panics. Jobs are expected to return their failures
//! as data; the pool never cancels siblings.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// A fixed-capacity pool gating spawned tasks through a semaphore.
pub struct BoundedPool {
    semaphore: Arc<Semaphore>,
}

impl BoundedPool {
    /// Create a pool allowing `concurrency` jobs in flight at once.
    ///
    /// `concurrency` is validated upstream by configuration.
    pub fn new(concurrency: usize) -> Self {
        debug_assert!(concurrency >= 1, "concurrency is validated upstream");
        Self {
            semaphore: Arc::new(Semaphore::new(concurrency)),
        }
    }

    /// Spawn a job that runs once a permit is available.
    ///
    /// Spawn order determines permit acquisition order, so jobs enter
    /// the pool in submission order even though they may complete in
    /// any order.
    pub fn spawn<F, T>(&self, job: F) -> JoinHandle<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let semaphore = Arc::clone(&self.semaphore);
        tokio::spawn(async move {
            // The semaphore is never closed while the pool is alive, so
            // acquisition only fails after every handle is gone.
            let _permit = semaphore.acquire_owned().await.ok();
            job.await
        })
    }
}
