//! Bounded fan-out / fan-in of per-plugin tasks.
//!
//! Each job becomes one tokio task. A semaphore caps how many run at once,
//! results come back through a queue sized to the number of jobs, and
//! [`Executor::run`] returns only after it has drained exactly one result
//! per job. A panicking job yields [`JobFailure::Panicked`] for its key and
//! leaves the others alone.

use std::any::Any;
use std::future::Future;
use std::num::NonZeroUsize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt as _;
use tokio::sync::{Semaphore, mpsc};
use tokio_util::sync::CancellationToken;

/// Default cap on simultaneously running plugin tasks.
pub const DEFAULT_JOBS: NonZeroUsize = match NonZeroUsize::new(15) {
    Some(n) => n,
    None => panic!("default job count must be non-zero"),
};

/// Why a job produced no value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobFailure {
    /// The run was cancelled before this job started.
    #[error("cancelled before start")]
    Cancelled,
    /// The job panicked.
    #[error("task panicked: {0}")]
    Panicked(String),
}

/// Runs keyed jobs under a concurrency bound.
#[derive(Debug, Clone)]
pub struct Executor {
    limit: NonZeroUsize,
    cancel: CancellationToken,
}

impl Executor {
    #[must_use]
    pub fn new(limit: NonZeroUsize, cancel: CancellationToken) -> Self {
        Self { limit, cancel }
    }

    /// Run every job and collect one result per job, in completion order.
    ///
    /// Jobs whose turn comes after cancellation are not polled at all.
    pub async fn run<K, O, Fut>(&self, jobs: Vec<(K, Fut)>) -> Vec<(K, Result<O, JobFailure>)>
    where
        K: Send + 'static,
        O: Send + 'static,
        Fut: Future<Output = O> + Send + 'static,
    {
        let expected = jobs.len();
        if expected == 0 {
            return Vec::new();
        }

        let gate = Arc::new(Semaphore::new(self.limit.get()));
        let (tx, mut rx) = mpsc::channel(expected);

        for (key, job) in jobs {
            // The gate is never closed, so acquisition only fails if it were.
            let Ok(permit) = Arc::clone(&gate).acquire_owned().await else {
                break;
            };
            let tx = tx.clone();
            let cancel = self.cancel.clone();
            tokio::spawn(async move {
                let outcome = if cancel.is_cancelled() {
                    Err(JobFailure::Cancelled)
                } else {
                    AssertUnwindSafe(job)
                        .catch_unwind()
                        .await
                        .map_err(|payload| JobFailure::Panicked(panic_message(payload.as_ref())))
                };
                drop(permit);
                // The receiver outlives every sender; a send error means the
                // caller stopped listening and the value is unwanted anyway.
                let _ = tx.send((key, outcome)).await;
            });
        }
        drop(tx);

        let mut results = Vec::with_capacity(expected);
        while results.len() < expected {
            match rx.recv().await {
                Some(item) => results.push(item),
                None => {
                    tracing::error!(
                        expected,
                        received = results.len(),
                        "result queue closed early"
                    );
                    break;
                }
            }
        }
        results
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
