//! Integration tests for the Tandem pattern toolkit.
//!
//! These tests verify the cross-component contract:
//! - Completeness: one result per submitted job, each id exactly once
//! - Error isolation: a failing job never affects its siblings
//! - Cancellation truncation: canceled batches close short, without deadlock
//! - No premature close: a closed stream never yields another result
//! - Dispatcher asymmetry: limiter failure is terminal and does not drain
//!   in-flight workers

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use futures::StreamExt;
use tandem::prelude::*;

/// The workshop processing function: square non-negative values, fail on
/// negatives.
async fn square_non_negative(_cancel: CancellationToken, value: i64) -> Result<i64> {
    if value < 0 {
        return Err(Error::process("negative value"));
    }
    Ok(value * value)
}

fn batch(range: std::ops::RangeInclusive<u64>) -> Vec<Job<i64>> {
    range.map(|i| Job::new(i, i as i64)).collect()
}

/// Worker pool: ten jobs in, ten results out, each id exactly once, squared.
#[tokio::test]
async fn test_pool_completeness() {
    let cancel = CancellationToken::new();
    let (jobs_tx, jobs_rx) = kanal::unbounded_async();
    let (results_tx, results_rx) = kanal::unbounded_async();

    spawn_pool(cancel, 3, jobs_rx, results_tx, square_non_negative);

    for job in batch(1..=10) {
        jobs_tx.send(job).await.unwrap();
    }
    jobs_tx.close();

    let mut values = HashMap::new();
    while let Ok(done) = results_rx.recv().await {
        assert!(
            values.insert(done.job.id, done.result.unwrap()).is_none(),
            "job {} reported twice",
            done.job.id
        );
    }
    let expected: HashMap<u64, i64> = (1..=10).map(|i| (i, (i * i) as i64)).collect();
    assert_eq!(values, expected);
}

/// Fan-out: same completeness property, one worker per job.
#[tokio::test]
async fn test_fan_out_completeness() {
    let cancel = CancellationToken::new();
    let results = fan_out(cancel, batch(1..=10), square_non_negative);

    let mut ids = HashSet::new();
    let mut values = HashSet::new();
    while let Ok(done) = results.recv().await {
        ids.insert(done.job.id);
        values.insert(done.result.unwrap());
    }
    assert_eq!(ids.len(), 10);
    let expected: HashSet<i64> = (1..=10).map(|i| i * i).collect();
    assert_eq!(values, expected);
}

/// A single failing job produces a single error result; every sibling
/// succeeds with the correct value.
#[tokio::test]
async fn test_error_isolation() {
    let cancel = CancellationToken::new();
    let mut jobs = batch(1..=9);
    jobs.push(Job::new(10, -1));

    let results = fan_out(cancel, jobs, square_non_negative);

    let mut failed = Vec::new();
    let mut succeeded = 0;
    while let Ok(done) = results.recv().await {
        match done.result {
            Ok(value) => {
                assert_eq!(value, (done.job.id * done.job.id) as i64);
                succeeded += 1;
            }
            Err(err) => {
                assert_eq!(err, Error::process("negative value"));
                failed.push(done.job.id);
            }
        }
    }
    assert_eq!(succeeded, 9);
    assert_eq!(failed, vec![10]);
}

/// Cancelling before the batch starts yields fewer than N results and a
/// closed stream, with no deadlock.
#[tokio::test]
async fn test_cancellation_truncates_fan_out() {
    let cancel = CancellationToken::new();
    cancel.cancel();

    let results = fan_out(cancel, batch(1..=100), square_non_negative);

    let mut count = 0;
    let drained = tokio::time::timeout(Duration::from_secs(2), async {
        while results.recv().await.is_ok() {
            count += 1;
        }
    })
    .await;
    assert!(drained.is_ok(), "canceled batch must still close its stream");
    assert!(count < 100);
}

/// After a stream reports closed it stays closed: no late results appear
/// from any component.
#[tokio::test]
async fn test_no_result_after_close() {
    let cancel = CancellationToken::new();
    let results = fan_out(cancel, batch(1..=20), square_non_negative);

    let mut count = 0;
    while results.recv().await.is_ok() {
        count += 1;
    }
    assert_eq!(count, 20);

    for _ in 0..3 {
        assert!(results.recv().await.is_err());
        assert!(results.try_recv().is_err());
    }
}

/// Pool workers only produce results for jobs actually dequeued; jobs left
/// in the queue at cancellation produce nothing, and every dequeued job
/// produces exactly one result.
#[tokio::test]
async fn test_pool_counts_match_dequeued_jobs() {
    let cancel = CancellationToken::new();
    let (jobs_tx, jobs_rx) = kanal::unbounded_async();
    let (results_tx, results_rx) = kanal::unbounded_async();

    let started = Arc::new(AtomicUsize::new(0));
    let counter = started.clone();
    spawn_pool(
        cancel.clone(),
        2,
        jobs_rx,
        results_tx,
        move |_cancel, value: i64| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(value)
            }
        },
    );

    for job in batch(1..=50) {
        jobs_tx.send(job).await.unwrap();
    }

    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();
    jobs_tx.close();

    let mut received = 0;
    while results_rx.recv().await.is_ok() {
        received += 1;
    }
    assert_eq!(received, started.load(Ordering::SeqCst));
    assert!(received < 50, "cancellation should leave jobs unprocessed");
}

/// The dispatcher processes a live stream where jobs arrive after the call
/// starts.
#[tokio::test]
async fn test_dispatch_live_submission() {
    let cancel = CancellationToken::new();
    let limiter = Arc::new(TokenBucket::new(0.0).with_burst(8));
    let (jobs_tx, jobs_rx) = kanal::unbounded_async();

    let results = dispatch(cancel, limiter, jobs_rx, square_non_negative);

    let producer = tokio::spawn(async move {
        for job in batch(1..=6) {
            jobs_tx.send(job).await.unwrap();
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        jobs_tx.close();
    });

    let mut ids = HashSet::new();
    while let Ok(done) = results.recv().await {
        ids.insert(done.job.id);
    }
    producer.await.unwrap();
    assert_eq!(ids.len(), 6);
}

/// Limiter failure is systemic: one terminal error result, then the stream
/// closes without draining the in-flight worker. This asymmetry with the
/// pool's wait-for-all rule is deliberate.
#[tokio::test]
async fn test_dispatch_limiter_failure_does_not_drain_workers() {
    let cancel = CancellationToken::new();
    let limiter = Arc::new(TokenBucket::new(0.0).with_burst(2));
    let (jobs_tx, jobs_rx) = kanal::unbounded_async();

    let slow = |_cancel: CancellationToken, value: i64| async move {
        tokio::time::sleep(Duration::from_millis(800)).await;
        Ok(value)
    };
    let results = dispatch(cancel, limiter.clone(), jobs_rx, slow);

    jobs_tx.send(Job::new(1, 1)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    limiter.close();
    jobs_tx.send(Job::new(2, 2)).await.unwrap();

    let start = Instant::now();
    let terminal = results.recv().await.unwrap();
    assert_eq!(terminal.job.id, 2);
    assert_eq!(terminal.result, Err(Error::LimiterClosed));
    assert!(results.recv().await.is_err());
    assert!(
        start.elapsed() < Duration::from_millis(600),
        "stream must close before the in-flight worker finishes"
    );
}

/// A fan-out result stream drains through the futures Stream adapter.
#[tokio::test]
async fn test_result_stream_adapter() {
    let cancel = CancellationToken::new();
    let results = fan_out(cancel, batch(1..=5), square_non_negative);

    let sum: i64 = ResultStream::new(results)
        .map(|done| done.result.unwrap())
        .fold(0, |acc, v| async move { acc + v })
        .await;
    assert_eq!(sum, 1 + 4 + 9 + 16 + 25);
}

/// Promise created under an already-canceled token resolves to the
/// cancellation error without running the computation.
#[tokio::test]
async fn test_promise_cancellation_short_circuit() {
    let cancel = CancellationToken::new();
    cancel.cancel();

    // If the computation ran it would produce a distinguishable error.
    let promise: Promise<i64> = Promise::spawn(cancel, |_cancel| async move {
        Err(Error::process("compute ran"))
    });
    assert_eq!(promise.result().await, Err(Error::Canceled));
}

/// A pipeline stage feeding a fan-out keeps the vocabulary composable:
/// stage output becomes a batch, batch results reduce to a value.
#[tokio::test]
async fn test_components_compose() {
    let cancel = CancellationToken::new();
    let (input_tx, input_rx) = kanal::bounded_async(0);

    // Stage 1: parse "n" strings, propagating parse failures as errors.
    let parsed = pipe(cancel.clone(), input_rx, |_cancel, r: Result<String>| async move {
        match r {
            Ok(text) => text
                .parse::<i64>()
                .map_err(|e| Error::process(format!("bad number: {e}"))),
            Err(err) => Err(err),
        }
    });

    tokio::spawn(async move {
        for text in ["1", "2", "three", "4"] {
            input_tx.send(Ok(text.to_string())).await.unwrap();
        }
        input_tx.close();
    });

    let mut values = Vec::new();
    let mut errors = 0;
    while let Ok(item) = parsed.recv().await {
        match item {
            Ok(n) => values.push(n),
            Err(_) => errors += 1,
        }
    }
    assert_eq!(values, vec![1, 2, 4]);
    assert_eq!(errors, 1);

    // Feed the surviving values through a fan-out batch.
    let jobs: Vec<Job<i64>> = values
        .into_iter()
        .enumerate()
        .map(|(i, v)| Job::new(i as u64, v))
        .collect();
    let results = fan_out(cancel, jobs, square_non_negative);

    let mut sum = 0;
    while let Ok(done) = results.recv().await {
        sum += done.result.unwrap();
    }
    assert_eq!(sum, 1 + 4 + 16);
}
