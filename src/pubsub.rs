//! Topic-based publish/subscribe broadcasting.
//!
//! Subscribers register the sending half of an `mpsc` channel under a topic
//! and keep the receiving half. Publishing attempts a non-blocking send to
//! every current subscriber of the topic: delivery is best-effort, with no
//! queueing and no retry — a subscriber whose buffer is full simply misses
//! that message.

use crate::observability;
use std::collections::HashMap;
use std::sync::RwLock;
use tokio::sync::mpsc;

/// A topic-keyed broadcaster over subscriber channels.
///
/// All methods take `&self` and are safe to call from any number of tasks
/// concurrently; share an instance with `Arc`. The subscriber registry is
/// the only state, and lives as long as the `PubSub` value — entries are
/// added and removed explicitly and never expire on their own.
///
/// Publishing to a topic nobody subscribes to is a silent no-op; topics are
/// never created or destroyed implicitly.
///
/// # Example
///
/// ```rust,ignore
/// use tandem::pubsub::PubSub;
/// use tokio::sync::mpsc;
///
/// let pubsub = PubSub::new();
/// let (tx, mut rx) = mpsc::channel(8);
///
/// pubsub.subscribe("alerts", tx);
/// pubsub.publish("alerts", "disk full".to_string());
///
/// assert_eq!(rx.recv().await, Some("disk full".to_string()));
/// ```
pub struct PubSub<T> {
    topics: RwLock<HashMap<String, Vec<mpsc::Sender<T>>>>,
}

impl<T> PubSub<T> {
    /// Create an empty broadcaster.
    pub fn new() -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
        }
    }

    /// Register a subscriber channel under a topic.
    ///
    /// A channel appears at most once per topic: re-subscribing the same
    /// channel is a no-op.
    pub fn subscribe(&self, topic: impl Into<String>, sender: mpsc::Sender<T>) {
        let topic = topic.into();
        let mut topics = self.topics.write().unwrap();
        let subscribers = topics.entry(topic.clone()).or_default();
        if subscribers.iter().any(|s| s.same_channel(&sender)) {
            tracing::debug!("subscribe ignored: channel already on topic '{}'", topic);
            return;
        }
        subscribers.push(sender);
    }

    /// Remove the first entry for this channel from a topic.
    ///
    /// Matching is by channel identity, not value. Unknown topics and
    /// channels are ignored.
    pub fn unsubscribe(&self, topic: &str, sender: &mpsc::Sender<T>) {
        let mut topics = self.topics.write().unwrap();
        let Some(subscribers) = topics.get_mut(topic) else {
            return;
        };
        if let Some(index) = subscribers.iter().position(|s| s.same_channel(sender)) {
            subscribers.remove(index);
        }
    }

    /// Number of subscribers currently registered on a topic.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .read()
            .unwrap()
            .get(topic)
            .map_or(0, Vec::len)
    }
}

impl<T: Clone> PubSub<T> {
    /// Broadcast a value to every current subscriber of a topic.
    ///
    /// Sends never block: a subscriber without capacity misses the message.
    /// The subscriber list is snapshotted before sending, so a channel
    /// subscribed mid-publish may or may not receive this particular value
    /// but can never observe a half-modified list.
    ///
    /// Returns the number of subscribers the value was delivered to.
    pub fn publish(&self, topic: &str, value: T) -> usize {
        let snapshot = {
            let topics = self.topics.read().unwrap();
            match topics.get(topic) {
                Some(subscribers) => subscribers.clone(),
                None => return 0,
            }
        };

        let mut delivered = 0;
        for subscriber in &snapshot {
            match subscriber.try_send(value.clone()) {
                Ok(()) => {
                    observability::record_publish_delivered(topic);
                    delivered += 1;
                }
                Err(mpsc::error::TrySendError::Full(_)) => {
                    observability::record_publish_dropped(topic);
                    tracing::debug!("publish to '{}' dropped: subscriber full", topic);
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    observability::record_publish_dropped(topic);
                    tracing::debug!("publish to '{}' dropped: subscriber gone", topic);
                }
            }
        }
        delivered
    }
}

impl<T> Default for PubSub<T> {
    fn default() -> Self {
        Self::new()
    }
}
