//! Topic registry for broadcast fan-out.
//!
//! Sessions joined to the same topic string receive each other's
//! broadcasts. Each topic owns one tokio broadcast channel; publishing
//! clones the sender out of the registry lock first, so no send ever runs
//! under the lock. Every published event carries the originating session
//! id so receivers can drop their own echoes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::wire::Broadcast;

/// What flows through a topic channel: the originating session and the
/// broadcast frame.
pub type TopicEvent = (Uuid, Broadcast);

const TOPIC_CHANNEL_CAPACITY: usize = 256;

/// Registry of topic name → broadcast channel.
#[derive(Clone, Default)]
pub struct TopicRegistry {
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<TopicEvent>>>>,
}

impl TopicRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a topic, creating its channel on first use.
    pub fn subscribe(&self, topic: &str) -> broadcast::Receiver<TopicEvent> {
        let mut channels = self.channels.lock().unwrap();
        channels
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(TOPIC_CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Publish a broadcast to every subscriber of a topic.
    ///
    /// Returns the number of subscribers reached (the originator counts
    /// itself; it drops the echo on receive). Publishing to a topic nobody
    /// subscribed to is a no-op.
    pub fn publish(&self, topic: &str, origin: Uuid, broadcast: Broadcast) -> usize {
        let sender = {
            let channels = self.channels.lock().unwrap();
            channels.get(topic).cloned()
        };

        match sender {
            Some(sender) => sender.send((origin, broadcast)).unwrap_or(0),
            None => 0,
        }
    }

    /// Drop topic channels that no session is subscribed to anymore.
    pub fn cleanup_inactive(&self) {
        self.channels
            .lock()
            .unwrap()
            .retain(|_, sender| sender.receiver_count() > 0);
    }

    /// Number of live topic channels.
    pub fn topic_count(&self) -> usize {
        self.channels.lock().unwrap().len()
    }

    /// Number of subscribers on a topic.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.channels
            .lock()
            .unwrap()
            .get(topic)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }
}
