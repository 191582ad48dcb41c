//! Metrics collection using metrics-rs.
//!
//! Tandem records counters through the [`metrics`] facade; whether they go
//! anywhere is up to the application, which installs an exporter (prometheus,
//! statsd, ...) or none at all.
//!
//! | Metric | Type | Description |
//! |--------|------|-------------|
//! | `tandem_jobs_admitted` | Counter | Jobs handed to a worker task |
//! | `tandem_jobs_completed` | Counter | Jobs whose processing returned a value |
//! | `tandem_jobs_failed` | Counter | Jobs whose processing returned an error |
//! | `tandem_results_discarded` | Counter | Worker results dropped on a closed stream |
//! | `tandem_publish_delivered` | Counter | Pub/sub messages delivered to a subscriber |
//! | `tandem_publish_dropped` | Counter | Pub/sub messages a subscriber missed |

use metrics::{Unit, counter};
use std::sync::atomic::{AtomicBool, Ordering};

/// Whether metric descriptions have been registered.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

// Metric names as constants for consistency
const JOBS_ADMITTED: &str = "tandem_jobs_admitted";
const JOBS_COMPLETED: &str = "tandem_jobs_completed";
const JOBS_FAILED: &str = "tandem_jobs_failed";
const RESULTS_DISCARDED: &str = "tandem_results_discarded";
const PUBLISH_DELIVERED: &str = "tandem_publish_delivered";
const PUBLISH_DROPPED: &str = "tandem_publish_dropped";

/// Register metric descriptions.
///
/// Call once at application startup, after installing a metrics recorder.
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init_metrics() {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        return; // Already initialized
    }

    metrics::describe_counter!(
        JOBS_ADMITTED,
        Unit::Count,
        "Total jobs handed to a worker task"
    );
    metrics::describe_counter!(
        JOBS_COMPLETED,
        Unit::Count,
        "Total jobs whose processing returned a value"
    );
    metrics::describe_counter!(
        JOBS_FAILED,
        Unit::Count,
        "Total jobs whose processing returned an error"
    );
    metrics::describe_counter!(
        RESULTS_DISCARDED,
        Unit::Count,
        "Total worker results dropped because the result stream had closed"
    );
    metrics::describe_counter!(
        PUBLISH_DELIVERED,
        Unit::Count,
        "Total pub/sub messages delivered to a subscriber"
    );
    metrics::describe_counter!(
        PUBLISH_DROPPED,
        Unit::Count,
        "Total pub/sub messages a subscriber missed"
    );
}

/// Record a job handed to a worker task.
#[inline]
pub fn record_job_admitted(component: &'static str) {
    counter!(JOBS_ADMITTED, "component" => component).increment(1);
}

/// Record a job whose processing returned a value.
#[inline]
pub fn record_job_completed(component: &'static str) {
    counter!(JOBS_COMPLETED, "component" => component).increment(1);
}

/// Record a job whose processing returned an error.
#[inline]
pub fn record_job_failed(component: &'static str) {
    counter!(JOBS_FAILED, "component" => component).increment(1);
}

/// Record a worker result dropped on a closed stream.
#[inline]
pub fn record_result_discarded(component: &'static str) {
    counter!(RESULTS_DISCARDED, "component" => component).increment(1);
}

/// Record a pub/sub message delivered to a subscriber.
#[inline]
pub fn record_publish_delivered(topic: &str) {
    counter!(PUBLISH_DELIVERED, "topic" => topic.to_string()).increment(1);
}

/// Record a pub/sub message a subscriber missed.
#[inline]
pub fn record_publish_dropped(topic: &str) {
    counter!(PUBLISH_DROPPED, "topic" => topic.to_string()).increment(1);
}
