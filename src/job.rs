//! Shared job and result vocabulary for all patterns.
//!
//! Every component consumes [`Job`]s and produces [`JobResult`]s (or plain
//! [`Result`](crate::error::Result) values for single-computation patterns).
//! The types carry no behavior of their own; they exist so results can be
//! correlated back to the jobs that produced them.

use crate::error::Result;
use kanal::AsyncReceiver;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// One unit of work: a caller-assigned id and a typed payload.
///
/// Ids need not be globally unique, only unique within one batch or stream so
/// results can be matched to jobs. A `Job` is immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job<T> {
    /// Caller-assigned identifier, echoed back in the job's result.
    pub id: u64,
    /// The payload handed to the processing function.
    pub value: T,
}

impl<T> Job<T> {
    /// Create a new job.
    pub fn new(id: u64, value: T) -> Self {
        Self { id, value }
    }
}

/// The outcome of processing one job: the job itself plus a value or error.
#[derive(Debug, Clone)]
pub struct JobResult<T, U> {
    /// The job this result belongs to.
    pub job: Job<T>,
    /// The processing outcome.
    pub result: Result<U>,
}

impl<T, U> JobResult<T, U> {
    /// Create a result for a job.
    pub fn new(job: Job<T>, result: Result<U>) -> Self {
        Self { job, result }
    }

    /// Whether processing failed for this job.
    pub fn is_err(&self) -> bool {
        self.result.is_err()
    }
}

/// A stream adapter over a result receiver.
///
/// Wraps any kanal receiver so result streams can be consumed with
/// `futures::StreamExt` combinators instead of a manual receive loop.
/// The stream ends when the channel closes.
pub struct ResultStream<T> {
    receiver: AsyncReceiver<T>,
}

impl<T> ResultStream<T> {
    /// Create a stream from a receiver.
    pub fn new(receiver: AsyncReceiver<T>) -> Self {
        Self { receiver }
    }
}

impl<T> From<AsyncReceiver<T>> for ResultStream<T> {
    fn from(receiver: AsyncReceiver<T>) -> Self {
        Self::new(receiver)
    }
}

impl<T> futures::Stream for ResultStream<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let fut = this.receiver.recv();
        tokio::pin!(fut);
        fut.poll(cx).map(|received| received.ok())
    }
}
