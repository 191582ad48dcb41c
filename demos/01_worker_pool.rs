//! A fixed pool of workers draining a shared job queue.
//!
//! Run with: cargo run --example 01_worker_pool

use std::time::Duration;
use tandem::prelude::*;

/// Simulate a lookup that takes a little while.
async fn slow_square(_cancel: CancellationToken, n: i64) -> Result<i64> {
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(n * n)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cancel = CancellationToken::new();
    let (jobs_tx, jobs_rx) = kanal::bounded_async(8);
    let (results_tx, results_rx) = kanal::bounded_async(8);

    // Three workers share the queue.
    spawn_pool(cancel.clone(), 3, jobs_rx, results_tx, slow_square);

    // Submit jobs from a separate task, then close the queue.
    tokio::spawn(async move {
        for i in 1..=12 {
            jobs_tx.send(Job::new(i, i as i64)).await.unwrap();
        }
        jobs_tx.close();
    });

    // Drain results until the pool closes the stream.
    while let Ok(done) = results_rx.recv().await {
        match done.result {
            Ok(value) => println!("job {:>2} -> {}", done.job.id, value),
            Err(err) => eprintln!("job {:>2} failed: {}", done.job.id, err),
        }
    }
    println!("pool finished");
}
