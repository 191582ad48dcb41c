//! Error types for Tandem.

use thiserror::Error;

/// Result type alias using Tandem's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Tandem operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A processing function reported a per-job failure.
    ///
    /// Recorded in that job's result; sibling jobs are unaffected.
    #[error("processing failed: {0}")]
    Process(String),

    /// The cancellation token fired before the work could run.
    #[error("operation canceled")]
    Canceled,

    /// The rate limiter failed or was closed while admitting work.
    ///
    /// This is a systemic condition, not a per-job failure: the dispatcher
    /// reports it once and stops.
    #[error("rate limiter closed")]
    LimiterClosed,

    /// A channel peer went away where that is a reportable condition.
    #[error("channel closed")]
    ChannelClosed,
}

impl Error {
    /// Shorthand for a per-job processing failure.
    pub fn process(msg: impl Into<String>) -> Self {
        Error::Process(msg.into())
    }
}
