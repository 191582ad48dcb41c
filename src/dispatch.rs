//! Rate-limited dispatcher for a live, unbounded job stream.
//!
//! A single dispatch loop pulls jobs as they arrive and admits a new worker
//! for each one only when the [`Limiter`](crate::limit::Limiter) permits.
//! Admission happens in the loop, not in the workers, so at most one task
//! ever waits on the limiter while admitted workers run fully concurrently.

use crate::error::Result;
use crate::job::{Job, JobResult};
use crate::limit::Limiter;
use crate::observability;
use kanal::{AsyncReceiver, AsyncSender};
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Dispatch a live job stream through a rate limiter.
///
/// The loop alternates between watching `cancel` (exit immediately) and
/// receiving from `jobs` (exit when the stream closes). Each received job
/// blocks on [`Limiter::acquire`] before one worker is spawned for it. On
/// either exit the result channel closes only after all launched workers
/// have finished.
///
/// The exception is a limiter failure: that is systemic, not per-job, so the
/// dispatcher sends one error result carrying the job that was being
/// admitted and closes the stream immediately, without waiting for
/// outstanding workers. Their late results are discarded by the closed
/// channel; the workers themselves are never forcibly interrupted.
///
/// The result channel is buffered to the limiter's burst allowance.
pub fn dispatch<T, U, L, F, Fut>(
    cancel: CancellationToken,
    limiter: Arc<L>,
    jobs: AsyncReceiver<Job<T>>,
    process: F,
) -> AsyncReceiver<JobResult<T, U>>
where
    T: Clone + Send + 'static,
    U: Send + 'static,
    L: Limiter + 'static,
    F: Fn(CancellationToken, T) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = Result<U>> + Send + 'static,
{
    let (results_tx, results_rx) = kanal::bounded_async(limiter.burst());

    tokio::spawn(async move {
        let mut handles: Vec<JoinHandle<()>> = Vec::new();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("dispatch loop shutting down: canceled");
                    break;
                }
                job = jobs.recv() => {
                    let Ok(job) = job else {
                        tracing::debug!("dispatch loop shutting down: job stream closed");
                        break;
                    };
                    if let Err(err) = limiter.acquire().await {
                        // Admission itself is broken; report it on the job at
                        // hand and stop without draining in-flight workers.
                        tracing::warn!("dispatch loop terminating, limiter failed: {}", err);
                        let _ = results_tx
                            .send(JobResult::new(job, Err(err)))
                            .await;
                        results_tx.close();
                        return;
                    }
                    observability::record_job_admitted("dispatch");
                    handles.push(spawn_worker(
                        cancel.clone(),
                        job,
                        results_tx.clone(),
                        process.clone(),
                    ));
                }
            }
        }

        for handle in handles {
            let _ = handle.await;
        }
        results_tx.close();
        tracing::debug!("dispatch finished, result channel closed");
    });

    results_rx
}

fn spawn_worker<T, U, F, Fut>(
    cancel: CancellationToken,
    job: Job<T>,
    results: AsyncSender<JobResult<T, U>>,
    process: F,
) -> JoinHandle<()>
where
    T: Clone + Send + 'static,
    U: Send + 'static,
    F: Fn(CancellationToken, T) -> Fut + Send + 'static,
    Fut: Future<Output = Result<U>> + Send + 'static,
{
    tokio::spawn(async move {
        let result = process(cancel, job.value.clone()).await;
        match &result {
            Ok(_) => observability::record_job_completed("dispatch"),
            Err(err) => {
                observability::record_job_failed("dispatch");
                tracing::debug!("dispatched job {} failed: {}", job.id, err);
            }
        }
        if results.send(JobResult::new(job, result)).await.is_err() {
            observability::record_result_discarded("dispatch");
            tracing::debug!("dispatched result discarded: stream closed");
        }
    })
}
