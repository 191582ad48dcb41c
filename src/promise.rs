//! Single-shot asynchronous computations.
//!
//! A [`Promise`] runs one computation on its own task and hands the outcome
//! back through a oneshot channel. Retrieving the result consumes the
//! handle, so the at-most-one-read rule is enforced by the type system
//! rather than by convention.

use crate::error::{Error, Result};
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

/// Handle to a one-shot asynchronous computation.
///
/// Created with [`Promise::spawn`]; resolved with [`Promise::result`] or by
/// awaiting the handle directly (it implements [`IntoFuture`]).
///
/// A promise that is never read holds one finished task's buffered outcome
/// until the handle drops — bounded, and acceptable for a single-shot
/// primitive.
///
/// # Example
///
/// ```rust,ignore
/// use tandem::prelude::*;
///
/// let promise = Promise::spawn(cancel, |_cancel| async move {
///     Ok(expensive_lookup().await?)
/// });
///
/// // ... do other work ...
///
/// let value = promise.result().await?;
/// ```
pub struct Promise<T> {
    receiver: oneshot::Receiver<Result<T>>,
}

impl<T: Send + 'static> Promise<T> {
    /// Start the computation on its own task.
    ///
    /// If `cancel` has already fired, the promise resolves to
    /// [`Error::Canceled`] without invoking `compute` at all. Otherwise it
    /// resolves to exactly what `compute` returns; a token fired mid-flight
    /// is `compute`'s own business to observe.
    pub fn spawn<F, Fut>(cancel: CancellationToken, compute: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        tokio::spawn(async move {
            let outcome = if cancel.is_cancelled() {
                tracing::debug!("promise resolved without computing: canceled");
                Err(Error::Canceled)
            } else {
                compute(cancel.clone()).await
            };
            if sender.send(outcome).is_err() {
                tracing::debug!("promise outcome discarded: handle dropped");
            }
        });
        Self { receiver }
    }

    /// Wait for the computation's outcome.
    ///
    /// Consumes the handle; a promise can be read exactly once.
    pub async fn result(self) -> Result<T> {
        self.receiver
            .await
            .unwrap_or(Err(Error::ChannelClosed))
    }
}

impl<T: Send + 'static> IntoFuture for Promise<T> {
    type Output = Result<T>;
    type IntoFuture = Pin<Box<dyn Future<Output = Result<T>> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.result())
    }
}
