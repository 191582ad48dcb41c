//! A live job stream admitted through a token bucket.
//!
//! Run with: cargo run --example 03_rate_limited

use std::sync::Arc;
use std::time::Instant;
use tandem::prelude::*;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cancel = CancellationToken::new();
    // Five admissions per second with a burst of 3.
    let limiter = Arc::new(TokenBucket::new(5.0).with_burst(3));
    let (jobs_tx, jobs_rx) = kanal::unbounded_async();

    let start = Instant::now();
    let results = dispatch(cancel, limiter, jobs_rx, |_cancel, n: i64| async move {
        Ok(n * n)
    });

    // Jobs keep arriving while the dispatcher runs.
    tokio::spawn(async move {
        for i in 1..=10 {
            jobs_tx.send(Job::new(i, i as i64)).await.unwrap();
        }
        jobs_tx.close();
    });

    while let Ok(done) = results.recv().await {
        println!(
            "[{:>5}ms] job {:>2} -> {:?}",
            start.elapsed().as_millis(),
            done.job.id,
            done.result
        );
    }
    println!("dispatch finished in {:?}", start.elapsed());
}
