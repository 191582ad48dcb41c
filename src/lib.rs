//! # Tandem
//!
//! A toolkit of concurrent task-execution patterns built on Tokio tasks and
//! kanal channels.
//!
//! Tandem takes care of the concurrency bookkeeping — fan-out, cancellation
//! propagation, completion detection, backpressure — so callers only describe
//! the work: a [`Job`](job::Job) (id + payload), an async processing
//! function, and a result stream drained until it closes.
//!
//! ## Patterns
//!
//! - **Worker pool**: a fixed number of workers draining one shared job queue
//! - **Fan-out/fan-in**: one worker per job of a finite batch, merged results
//! - **Rate-limited dispatch**: a live job stream admitted through a limiter
//! - **Pipeline**: chained single-task stages with rendezvous backpressure
//! - **Promise**: a one-shot computation retrieved by a single await
//! - **Pub/sub**: topic-keyed best-effort broadcast to subscriber channels
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tandem::prelude::*;
//!
//! let cancel = CancellationToken::new();
//! let jobs = (1..=10).map(|i| Job::new(i, i as i32)).collect();
//!
//! let results = fan_out(cancel, jobs, |_cancel, n: i32| async move {
//!     Ok(n * n)
//! });
//!
//! while let Ok(done) = results.recv().await {
//!     println!("job {} -> {:?}", done.job.id, done.result);
//! }
//! ```
//!
//! Components are independent and composable: a pipeline stage may use a
//! worker pool internally, a promise may wrap a fan-out batch, and all of
//! them share the same cancellation token type.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod dispatch;
pub mod error;
pub mod fanout;
pub mod job;
pub mod limit;
pub mod observability;
pub mod pipeline;
pub mod pool;
pub mod promise;
pub mod pubsub;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::dispatch::dispatch;
    pub use crate::error::{Error, Result};
    pub use crate::fanout::fan_out;
    pub use crate::job::{Job, JobResult, ResultStream};
    pub use crate::limit::{Limiter, TokenBucket};
    pub use crate::pipeline::pipe;
    pub use crate::pool::spawn_pool;
    pub use crate::promise::Promise;
    pub use crate::pubsub::PubSub;
    pub use tokio_util::sync::CancellationToken;
}

pub use error::{Error, Result};
