//! Rate limiting for the dispatcher.
//!
//! The dispatcher does not care how admission is decided; it only needs the
//! [`Limiter`] contract: block until the next unit of work may start, or fail
//! if the limiter itself has ended. [`TokenBucket`] is the built-in
//! implementation with a steady refill rate and a burst allowance.

use crate::error::{Error, Result};
use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Admission control for dynamically dispatched work.
///
/// An implementation decides *when* the next unit of work may start; the
/// dispatcher guarantees at most one task waits in [`acquire`](Limiter::acquire)
/// at a time.
pub trait Limiter: Send + Sync {
    /// Wait until the next unit of work may be admitted.
    ///
    /// An error means the limiter itself has failed or ended — a systemic
    /// condition, distinct from any per-job failure. The dispatcher reports
    /// it once and stops.
    fn acquire(&self) -> impl Future<Output = Result<()>> + Send;

    /// The burst allowance: how many admissions can happen back to back
    /// after an idle period. Used to size result buffers.
    fn burst(&self) -> usize;
}

struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

/// A token bucket limiter: a steady refill rate plus a burst allowance.
///
/// The bucket starts full. Each admission takes one token; tokens refill
/// continuously at `rate` per second up to `burst`. A non-positive rate
/// disables limiting entirely (every acquire succeeds immediately).
///
/// # Example
///
/// ```rust,ignore
/// use tandem::limit::{Limiter, TokenBucket};
///
/// // 10 admissions per second, bursts of up to 5.
/// let bucket = TokenBucket::new(10.0).with_burst(5);
///
/// bucket.acquire().await?;  // immediate while tokens remain
/// bucket.close();           // subsequent acquires fail
/// ```
pub struct TokenBucket {
    rate: f64,
    burst: usize,
    state: Mutex<BucketState>,
    closed: CancellationToken,
}

impl TokenBucket {
    /// Create a bucket admitting `rate` units per second with a burst of 1.
    pub fn new(rate: f64) -> Self {
        Self {
            rate,
            burst: 1,
            state: Mutex::new(BucketState {
                tokens: 1.0,
                last_refill: Instant::now(),
            }),
            closed: CancellationToken::new(),
        }
    }

    /// Set the burst allowance. The bucket is refilled to the new capacity.
    pub fn with_burst(mut self, burst: usize) -> Self {
        self.burst = burst;
        self.state.get_mut().unwrap().tokens = burst as f64;
        self
    }

    /// Close the bucket: every pending and future acquire fails with
    /// [`Error::LimiterClosed`].
    pub fn close(&self) {
        self.closed.cancel();
    }

    /// Whether the bucket has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Refill from elapsed time, then either take a token or report how long
    /// until one is available.
    fn try_take(&self) -> std::result::Result<(), Duration> {
        let mut state = self.state.lock().unwrap();
        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill);
        state.tokens = (state.tokens + elapsed.as_secs_f64() * self.rate).min(self.burst as f64);
        state.last_refill = now;

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            Ok(())
        } else {
            Err(Duration::from_secs_f64((1.0 - state.tokens) / self.rate))
        }
    }
}

impl Limiter for TokenBucket {
    async fn acquire(&self) -> Result<()> {
        if self.rate <= 0.0 {
            return Ok(()); // unlimited
        }
        loop {
            if self.closed.is_cancelled() {
                return Err(Error::LimiterClosed);
            }
            let wait = match self.try_take() {
                Ok(()) => return Ok(()),
                Err(wait) => wait,
            };
            tokio::select! {
                _ = self.closed.cancelled() => return Err(Error::LimiterClosed),
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }

    fn burst(&self) -> usize {
        self.burst
    }
}
