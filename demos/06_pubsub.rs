//! Topic-based best-effort broadcasting to subscriber channels.
//!
//! Run with: cargo run --example 06_pubsub

use std::sync::Arc;
use tandem::pubsub::PubSub;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let pubsub = Arc::new(PubSub::new());

    let (tx1, mut rx1) = mpsc::channel(4);
    let (tx2, mut rx2) = mpsc::channel(4);
    pubsub.subscribe("sensor/temp", tx1.clone());
    pubsub.subscribe("sensor/temp", tx2);

    // Nobody listens on this topic; the publish is a silent no-op.
    pubsub.publish("sensor/humidity", 55);

    let delivered = pubsub.publish("sensor/temp", 21);
    println!("delivered to {delivered} subscribers");

    println!("subscriber 1 got {:?}", rx1.recv().await);
    println!("subscriber 2 got {:?}", rx2.recv().await);

    // After unsubscribing, only the remaining channel receives.
    pubsub.unsubscribe("sensor/temp", &tx1);
    let delivered = pubsub.publish("sensor/temp", 22);
    println!("after unsubscribe, delivered to {delivered} subscriber(s)");
    println!("subscriber 2 got {:?}", rx2.recv().await);
}
