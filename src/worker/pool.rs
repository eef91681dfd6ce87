use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Semaphore, watch};
use tokio::task::{Id, JoinSet};
use tracing::{debug, warn};
use crate::core::PipelineConfig;
use super::{WorkerError, WorkerResult};

const DEFAULT_WORKERS: usize = 4;

/// Results of one fan-out, in the order the names were submitted.
#[derive(Debug)]
pub struct PoolRun<R> {
    pub results: Vec<(String, WorkerResult<R>)>,
    /// A shutdown signal stopped the run before every task finished
    pub cancelled: bool,
}

/// Bounded fan-out of per-file jobs.
///
/// At most `worker_count` jobs run at once and each one gets the same
/// deadline. Jobs share no state; callers reduce the returned results.
#[derive(Clone)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    active_workers: Arc<AtomicUsize>,
    worker_count: usize,
    timeout: Duration,
}

impl WorkerPool {
    pub fn new(worker_count: Option<usize>, timeout: Duration) -> Self {
        let worker_count = worker_count.unwrap_or(DEFAULT_WORKERS).max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(worker_count)),
            active_workers: Arc::new(AtomicUsize::new(0)),
            worker_count,
            timeout,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(Some(config.concurrency), config.file_timeout())
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Runs `job` once per name and joins all of them.
    ///
    /// When `shutdown` flips to `true`, tasks still in flight are aborted and
    /// only the finished ones are returned. A job that panics is reported as
    /// a failed result under its own name.
    pub async fn run_all<F, Fut, R>(
        &self,
        names: Vec<String>,
        job: F,
        mut shutdown: Option<watch::Receiver<bool>>,
    ) -> PoolRun<R>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = R> + Send + 'static,
        R: Send + 'static,
    {
        let total = names.len();
        debug!("Dispatching {} tasks across {} workers", total, self.worker_count);

        let mut set = JoinSet::new();
        let mut pending: HashMap<Id, (usize, String)> = HashMap::with_capacity(total);
        for (index, name) in names.into_iter().enumerate() {
            let semaphore = self.semaphore.clone();
            let active = self.active_workers.clone();
            let deadline = self.timeout;
            let work = job(name.clone());
            let task_name = name.clone();

            let handle = set.spawn(async move {
                match semaphore.acquire_owned().await {
                    Ok(_permit) => {
                        let current = active.fetch_add(1, Ordering::SeqCst) + 1;
                        debug!("Worker started - Active: {}, Task: {}", current, task_name);
                        let outcome = tokio::time::timeout(deadline, work)
                            .await
                            .map_err(|_| WorkerError::Timeout(deadline.as_secs()));
                        active.fetch_sub(1, Ordering::SeqCst);
                        outcome
                    }
                    Err(e) => Err(WorkerError::from(e)),
                }
            });
            pending.insert(handle.id(), (index, name));
        }

        let mut finished = Vec::with_capacity(total);
        let mut cancelled = false;
        loop {
            let joined = match shutdown.as_mut() {
                Some(rx) if !cancelled => tokio::select! {
                    joined = set.join_next_with_id() => joined,
                    _ = wait_for_shutdown(rx) => {
                        warn!("Shutdown requested, abandoning {} in-flight tasks", set.len());
                        set.abort_all();
                        cancelled = true;
                        continue;
                    }
                },
                _ => set.join_next_with_id().await,
            };

            match joined {
                None => break,
                Some(Ok((id, result))) => {
                    if let Some((index, name)) = pending.remove(&id) {
                        finished.push((index, name, result));
                    }
                }
                Some(Err(e)) if e.is_cancelled() => {}
                Some(Err(e)) => {
                    if let Some((index, name)) = pending.remove(&e.id()) {
                        warn!("Task for '{}' panicked", name);
                        finished.push((index, name, Err(WorkerError::from(e))));
                    }
                }
            }
        }

        finished.sort_by_key(|(index, _, _)| *index);
        PoolRun {
            results: finished
                .into_iter()
                .map(|(_, name, result)| (name, result))
                .collect(),
            cancelled,
        }
    }
}

async fn wait_for_shutdown(rx: &mut watch::Receiver<bool>) {
    if rx.wait_for(|stop| *stop).await.is_err() {
        // Sender gone without a shutdown: never fire.
        std::future::pending::<()>().await;
    }
}
