//! Two chained pipeline stages with rendezvous backpressure between them.
//!
//! Run with: cargo run --example 04_pipeline

use tandem::prelude::*;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cancel = CancellationToken::new();
    let (input_tx, input_rx) = kanal::bounded_async(0);

    // Stage 1: square the value, rejecting negatives.
    let squared = pipe(cancel.clone(), input_rx, |_cancel, r: Result<i64>| async move {
        match r {
            Ok(n) if n < 0 => Err(Error::process("negative value")),
            Ok(n) => Ok(n * n),
            Err(err) => Err(err),
        }
    });

    // Stage 2: format, passing upstream errors through.
    let formatted = pipe(cancel, squared, |_cancel, r: Result<i64>| async move {
        r.map(|n| format!("square = {n}"))
    });

    tokio::spawn(async move {
        for n in [3, 1, -4, 5] {
            input_tx.send(Ok(n)).await.unwrap();
        }
        input_tx.close();
    });

    // Single-task stages preserve input order end to end.
    while let Ok(item) = formatted.recv().await {
        match item {
            Ok(text) => println!("{text}"),
            Err(err) => eprintln!("stage error: {err}"),
        }
    }
}
