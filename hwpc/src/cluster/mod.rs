//! Worker pool lifecycle shared by every stage of a run.
//!
//! A [`ClusterHandle`] bounds how many simulation or reporting futures execute at once
//! and offers named locks for sections that must serialize, like progress reporting. The
//! handle is cheap to clone and passed explicitly to whoever needs it, so tests can run
//! isolated clusters side by side.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Semaphore;
use tracing::info;

use crate::error::{ErrorKind, HwpcResult};
use crate::{bail, hwpc_error};
use hwpc_config::shared::ClusterConfig;

#[derive(Debug)]
struct ClusterInner {
    workers: usize,
    permits: Semaphore,
    shutting_down: AtomicBool,
    named_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

/// Handle to a bounded worker pool.
#[derive(Debug, Clone)]
pub struct ClusterHandle {
    inner: Arc<ClusterInner>,
}

impl ClusterHandle {
    /// Starts a cluster with the configured number of workers.
    pub fn start(config: &ClusterConfig) -> HwpcResult<Self> {
        if config.workers == 0 {
            bail!(
                ErrorKind::ClusterConstructionFailed,
                "A cluster requires at least one worker"
            );
        }

        info!(workers = config.workers, "starting cluster");

        Ok(Self {
            inner: Arc::new(ClusterInner {
                workers: config.workers,
                permits: Semaphore::new(config.workers),
                shutting_down: AtomicBool::new(false),
                named_locks: Mutex::new(HashMap::new()),
            }),
        })
    }

    /// Returns the number of workers this cluster was started with.
    pub fn workers(&self) -> usize {
        self.inner.workers
    }

    /// Runs a future on the cluster, waiting for a free worker slot.
    ///
    /// Fails with [`ErrorKind::ClusterUnavailable`] once the cluster has been shut down,
    /// including for callers already waiting on a slot.
    pub async fn run<F>(&self, future: F) -> HwpcResult<F::Output>
    where
        F: Future,
    {
        let _permit = self.inner.permits.acquire().await.map_err(|_| {
            hwpc_error!(
                ErrorKind::ClusterUnavailable,
                "Cluster was shut down while work was pending"
            )
        })?;

        Ok(future.await)
    }

    /// Returns the lock registered under `name`, creating it on first use.
    ///
    /// The same name always yields the same lock for clones of this handle, which is how
    /// progress reporting serializes across concurrent tasks.
    pub fn named_lock(&self, name: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .inner
            .named_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        locks
            .entry(name.to_owned())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Shuts the cluster down, releasing no further worker slots.
    ///
    /// Futures already running are unaffected; pending and future [`ClusterHandle::run`]
    /// calls fail. Safe to call multiple times.
    pub fn shutdown(&self) {
        if self.inner.shutting_down.swap(true, Ordering::SeqCst) {
            return;
        }

        info!("shutting down cluster");

        self.inner.permits.close();
    }

    /// Returns whether [`ClusterHandle::shutdown`] has been called.
    pub fn is_shutting_down(&self) -> bool {
        self.inner.shutting_down.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster(workers: usize) -> HwpcResult<ClusterHandle> {
        ClusterHandle::start(&ClusterConfig { workers })
    }

    #[test]
    fn zero_workers_is_rejected() {
        let result = cluster(0);

        assert_eq!(
            result.unwrap_err().kind(),
            ErrorKind::ClusterConstructionFailed
        );
    }

    #[tokio::test]
    async fn run_executes_future() {
        let cluster = cluster(2).unwrap();

        let value = cluster.run(async { 21 * 2 }).await.unwrap();

        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn run_fails_after_shutdown() {
        let cluster = cluster(2).unwrap();

        cluster.shutdown();
        cluster.shutdown();

        let result = cluster.run(async { 0 }).await;
        assert_eq!(result.unwrap_err().kind(), ErrorKind::ClusterUnavailable);
    }

    #[tokio::test]
    async fn named_locks_are_shared_by_name() {
        let cluster = cluster(1).unwrap();

        let first = cluster.named_lock("progress");
        let second = cluster.clone().named_lock("progress");
        let other = cluster.named_lock("other");

        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &other));
    }
}
