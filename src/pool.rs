//! Worker pool: a fixed number of workers draining one shared job queue.
//!
//! All workers receive from the same job channel and send to the same result
//! channel; a supervisor closes the result channel once every worker has
//! returned, so a caller draining results until the channel closes has seen
//! everything the pool will ever produce.

use crate::error::Result;
use crate::job::{Job, JobResult};
use crate::observability;
use kanal::{AsyncReceiver, AsyncSender};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Start a pool of `workers` concurrent workers.
///
/// Each worker loops: receive one job from `jobs`, run `process` on its
/// payload, send a [`JobResult`] to `results`. A worker exits when the job
/// channel is closed and drained, or at the next job boundary after `cancel`
/// fires. Work already inside `process` is never forcibly interrupted; make
/// the function itself watch the token if hard responsiveness is needed.
///
/// Exactly one result is produced per job actually dequeued. Jobs still
/// queued when the channel closes or cancellation fires produce nothing.
/// `results` is closed exactly once, after the last worker has returned.
///
/// # Example
///
/// ```rust,ignore
/// use tandem::prelude::*;
///
/// let (jobs_tx, jobs_rx) = kanal::unbounded_async();
/// let (results_tx, results_rx) = kanal::unbounded_async();
///
/// spawn_pool(cancel, 3, jobs_rx, results_tx, |_cancel, n: i32| async move {
///     Ok(n * n)
/// });
///
/// for i in 1..=10 {
///     jobs_tx.send(Job::new(i, i as i32)).await?;
/// }
/// jobs_tx.close();
///
/// while let Ok(done) = results_rx.recv().await {
///     println!("job {} -> {:?}", done.job.id, done.result);
/// }
/// ```
pub fn spawn_pool<T, U, F, Fut>(
    cancel: CancellationToken,
    workers: usize,
    jobs: AsyncReceiver<Job<T>>,
    results: AsyncSender<JobResult<T, U>>,
    process: F,
) where
    T: Clone + Send + 'static,
    U: Send + 'static,
    F: Fn(CancellationToken, T) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = Result<U>> + Send + 'static,
{
    let mut handles = Vec::with_capacity(workers);
    for id in 0..workers {
        handles.push(tokio::spawn(worker(
            id,
            cancel.clone(),
            jobs.clone(),
            results.clone(),
            process.clone(),
        )));
    }

    tokio::spawn(async move {
        for handle in handles {
            let _ = handle.await;
        }
        results.close();
        tracing::debug!("worker pool finished, result channel closed");
    });
}

/// One worker: receive, process, send, until closed or canceled.
async fn worker<T, U, F, Fut>(
    id: usize,
    cancel: CancellationToken,
    jobs: AsyncReceiver<Job<T>>,
    results: AsyncSender<JobResult<T, U>>,
    process: F,
) where
    T: Clone + Send + 'static,
    U: Send + 'static,
    F: Fn(CancellationToken, T) -> Fut + Send,
    Fut: Future<Output = Result<U>> + Send + 'static,
{
    tracing::debug!("worker {} started", id);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("worker {} shutting down: canceled", id);
                return;
            }
            job = jobs.recv() => {
                let Ok(job) = job else {
                    tracing::debug!("worker {} shutting down: job channel closed", id);
                    return;
                };
                observability::record_job_admitted("pool");
                let result = process(cancel.clone(), job.value.clone()).await;
                match &result {
                    Ok(_) => observability::record_job_completed("pool"),
                    Err(err) => {
                        observability::record_job_failed("pool");
                        tracing::debug!("worker {}: job {} failed: {}", id, job.id, err);
                    }
                }
                if results.send(JobResult::new(job, result)).await.is_err() {
                    observability::record_result_discarded("pool");
                    tracing::debug!("worker {} shutting down: result channel closed", id);
                    return;
                }
            }
        }
    }
}
