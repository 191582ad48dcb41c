//! A one-shot computation retrieved with a single await.
//!
//! Run with: cargo run --example 05_promise

use std::time::Duration;
use tandem::prelude::*;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cancel = CancellationToken::new();

    let answer = Promise::spawn(cancel.clone(), |_cancel| async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(6 * 7)
    });

    // Do other work while the computation runs in the background.
    println!("waiting for the answer...");

    match answer.result().await {
        Ok(value) => println!("the answer is {value}"),
        Err(err) => eprintln!("no answer: {err}"),
    }

    // A promise spawned under an already-canceled token never computes.
    cancel.cancel();
    let skipped: Result<i64> = Promise::spawn(cancel, |_cancel| async move {
        println!("this never prints: the token was already canceled");
        Ok(0)
    })
    .await;
    println!("canceled promise resolved to: {skipped:?}");
}
