//! Fan-out/fan-in: one worker per job of a finite batch, one merged stream.
//!
//! Unlike the worker pool, which bounds concurrency by worker count, fan-out
//! spawns a worker for every job in the batch at once and merges everything
//! into a single result channel sized to the batch, so no worker ever blocks
//! on a slow consumer.

use crate::error::Result;
use crate::job::{Job, JobResult};
use crate::observability;
use kanal::AsyncReceiver;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Fan a finite batch of jobs out to one worker each and fan the results
/// back in.
///
/// The supervisor walks the batch in order. Before admitting each job it
/// checks `cancel`: once the token fires, no further jobs are admitted —
/// workers already running keep running and still emit their results — and
/// the stop point is logged. After every admitted worker has finished, the
/// returned channel closes.
///
/// Results arrive in completion order, not submission order; re-key by
/// [`Job::id`](crate::job::Job) if submission order matters.
///
/// # Example
///
/// ```rust,ignore
/// use tandem::prelude::*;
///
/// let jobs: Vec<Job<i32>> = (1..=10).map(|i| Job::new(i, i as i32)).collect();
/// let results = fan_out(cancel, jobs, |_cancel, n| async move { Ok(n * n) });
///
/// while let Ok(done) = results.recv().await {
///     println!("job {} -> {:?}", done.job.id, done.result);
/// }
/// ```
pub fn fan_out<T, U, F, Fut>(
    cancel: CancellationToken,
    jobs: Vec<Job<T>>,
    process: F,
) -> AsyncReceiver<JobResult<T, U>>
where
    T: Clone + Send + 'static,
    U: Send + 'static,
    F: Fn(CancellationToken, T) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = Result<U>> + Send + 'static,
{
    let (results_tx, results_rx) = kanal::bounded_async(jobs.len());

    tokio::spawn(async move {
        let total = jobs.len();
        let mut handles = Vec::with_capacity(total);

        for (admitted, job) in jobs.into_iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::info!(
                    "fan-out shutting down: canceled after admitting {} of {} jobs",
                    admitted,
                    total
                );
                break;
            }
            observability::record_job_admitted("fanout");

            let cancel = cancel.clone();
            let results_tx = results_tx.clone();
            let process = process.clone();
            handles.push(tokio::spawn(async move {
                let result = process(cancel, job.value.clone()).await;
                match &result {
                    Ok(_) => observability::record_job_completed("fanout"),
                    Err(err) => {
                        observability::record_job_failed("fanout");
                        tracing::debug!("fan-out job {} failed: {}", job.id, err);
                    }
                }
                if results_tx.send(JobResult::new(job, result)).await.is_err() {
                    observability::record_result_discarded("fanout");
                }
            }));
        }

        for handle in handles {
            let _ = handle.await;
        }
        results_tx.close();
        tracing::debug!("fan-out batch finished, result channel closed");
    });

    results_rx
}
