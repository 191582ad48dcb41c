//! Linear pipeline stages with rendezvous backpressure.
//!
//! A stage is one task reading an input stream of results, applying a
//! transform, and emitting an output stream. Stages compose by chaining the
//! output receiver of one [`pipe`] call into the input of the next. The
//! output channel has no buffer: a slow consumer blocks the stage, which in
//! turn blocks its upstream producer — flow control falls out of the channel
//! capacity rather than any explicit signaling.

use crate::error::Result;
use kanal::AsyncReceiver;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Run one pipeline stage.
///
/// `stage` maps a whole `Result<T>` to a `Result<U>` — it sees upstream
/// errors and decides whether to propagate, transform, or suppress them.
/// The stage task reads `input` until it closes or `cancel` fires, then
/// closes its output.
///
/// There is no concurrency inside a stage, so input order is preserved.
/// Throughput scaling comes from chaining stages, or from a stage internally
/// fanning work out with the pool or fan-out patterns.
///
/// # Example
///
/// ```rust,ignore
/// use tandem::prelude::*;
///
/// let (input_tx, input_rx) = kanal::bounded_async(0);
/// let doubled = pipe(cancel.clone(), input_rx, |_cancel, r: Result<i32>| async move {
///     r.map(|n| n * 2)
/// });
/// let printed = pipe(cancel, doubled, |_cancel, r: Result<i32>| async move {
///     r.map(|n| format!("n = {n}"))
/// });
/// ```
pub fn pipe<T, U, F, Fut>(
    cancel: CancellationToken,
    input: AsyncReceiver<Result<T>>,
    stage: F,
) -> AsyncReceiver<Result<U>>
where
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(CancellationToken, Result<T>) -> Fut + Send + 'static,
    Fut: Future<Output = Result<U>> + Send + 'static,
{
    let (output_tx, output_rx) = kanal::bounded_async(0);

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("pipeline stage shutting down: canceled");
                    break;
                }
                item = input.recv() => {
                    let Ok(item) = item else {
                        tracing::debug!("pipeline stage shutting down: input closed");
                        break;
                    };
                    let out = stage(cancel.clone(), item).await;
                    if output_tx.send(out).await.is_err() {
                        tracing::debug!("pipeline stage shutting down: output closed");
                        break;
                    }
                }
            }
        }
        output_tx.close();
    });

    output_rx
}
