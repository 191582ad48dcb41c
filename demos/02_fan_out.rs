//! One worker per job of a finite batch, results merged into one stream.
//!
//! Run with: cargo run --example 02_fan_out

use tandem::prelude::*;

async fn square_non_negative(_cancel: CancellationToken, n: i64) -> Result<i64> {
    if n < 0 {
        return Err(Error::process("negative value"));
    }
    Ok(n * n)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cancel = CancellationToken::new();
    let jobs: Vec<Job<i64>> = (1..=10).map(|i| Job::new(i, i as i64)).collect();

    let results = fan_out(cancel, jobs, square_non_negative);

    // Results arrive in completion order; sum is order-independent.
    let mut sum = 0;
    while let Ok(done) = results.recv().await {
        let value = done.result.expect("all inputs are non-negative");
        println!("job {:>2} -> {}", done.job.id, value);
        sum += value;
    }
    println!("sum of squares 1..=10: {sum}");
}
