//! Topic Broker - process-local publish/subscribe
//!
//! The broker routes events by [`Topic`] to every subscriber currently
//! registered under that topic. It is an ephemeral, best-effort notification
//! layer: the store is the source of truth, nothing is persisted or replayed.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                  Broker (RwLock<topic → subscribers>)            │
//! │                                                                  │
//! │  Publishers:                     Subscribers (bounded queues):   │
//! │  ├─ SceneAppService              ├─ SyncSession  (table:42)      │
//! │  ├─ PlacedObjectAppService ──┐   ├─ SyncSession  (scene:7)       │
//! │  ├─ ChatAppService           └──▶├─ SyncSession  (scene:7)       │
//! │  └─ ...                          └─ ...                          │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Publishing takes the read lock and uses `try_send`, so a slow consumer
//! never delays the publisher or other consumers: when a subscriber's queue
//! is full, that subscriber's copy of the incoming event is dropped.
//! Subscribe and unsubscribe take the write lock.
//!
//! # Usage
//!
//! ```ignore
//! let broker = create_shared_broker(DEFAULT_QUEUE_CAPACITY);
//!
//! // Session side
//! let (subscriber, mut inbox) = broker.new_subscriber();
//! let _subscription = broker.join(&subscriber, [Topic::scene(7)]);
//!
//! // Service side
//! let publisher = EventPublisher::new(broker.clone());
//! publisher.publish(SyncEvent::for_scene(7, action));
//!
//! while let Some(event) = inbox.recv().await { ... }
//! ```

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, trace};

use crate::domain::SyncEvent;
use crate::topic::Topic;

/// Default per-subscriber queue capacity
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Opaque identity of a subscriber, used only as the removal key
pub type SubscriberId = u64;

/// Receiving end of a subscriber's queue
pub type Inbox<E> = mpsc::Receiver<Arc<E>>;

type Queue<E> = mpsc::Sender<Arc<E>>;

/// Registration handle for a bounded queue
///
/// Cloning shares the same queue and identity.
pub struct Subscriber<E> {
    id: SubscriberId,
    queue: Queue<E>,
}

impl<E> Subscriber<E> {
    pub fn id(&self) -> SubscriberId {
        self.id
    }
}

impl<E> Clone for Subscriber<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            queue: self.queue.clone(),
        }
    }
}

/// Topic → subscriber-set mapping
pub struct Broker<E> {
    topics: RwLock<HashMap<String, HashMap<SubscriberId, Queue<E>>>>,
    next_id: AtomicU64,
    capacity: usize,
}

impl<E> Broker<E> {
    /// Create a broker with the default queue capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    /// Create a broker whose subscribers get queues of `capacity` events
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Allocate a fresh subscriber and the inbox it delivers to
    pub fn new_subscriber(&self) -> (Subscriber<E>, Inbox<E>) {
        let (queue, inbox) = mpsc::channel(self.capacity);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        (Subscriber { id, queue }, inbox)
    }

    /// Register `subscriber` under `topic`
    ///
    /// Idempotent: registering the same pair twice keeps a single entry.
    pub fn subscribe(&self, topic: &Topic, subscriber: &Subscriber<E>) {
        let key = topic.key();
        let mut topics = self.topics.write();
        topics
            .entry(key)
            .or_default()
            .insert(subscriber.id, subscriber.queue.clone());

        debug!(
            topic = %topic,
            subscriber_id = subscriber.id,
            "[Broker] Subscribed"
        );
    }

    /// Remove `subscriber_id` from `topic`; no-op when not registered
    ///
    /// The topic entry is dropped once its last subscriber leaves.
    pub fn unsubscribe(&self, topic: &Topic, subscriber_id: SubscriberId) {
        let key = topic.key();
        let mut topics = self.topics.write();
        let Some(subscribers) = topics.get_mut(&key) else {
            return;
        };

        if subscribers.remove(&subscriber_id).is_some() {
            debug!(topic = %topic, subscriber_id, "[Broker] Unsubscribed");
        }
        if subscribers.is_empty() {
            topics.remove(&key);
        }
    }

    /// Deliver `event` to every subscriber of `topic`
    ///
    /// Returns the number of queues that accepted the event. Never blocks
    /// and never fails.
    pub fn publish(&self, topic: &Topic, event: E) -> usize {
        self.publish_shared(topic, Arc::new(event))
    }

    /// Like [`Broker::publish`] for an already shared event
    pub fn publish_shared(&self, topic: &Topic, event: Arc<E>) -> usize {
        let key = topic.key();
        let topics = self.topics.read();
        let Some(subscribers) = topics.get(&key) else {
            trace!(topic = %topic, "[Broker] No subscribers for topic");
            return 0;
        };

        let mut delivered = 0;
        for (subscriber_id, queue) in subscribers {
            match queue.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    debug!(
                        topic = %topic,
                        subscriber_id = *subscriber_id,
                        "[Broker] Queue full, dropping event for subscriber"
                    );
                }
                Err(TrySendError::Closed(_)) => {
                    trace!(
                        topic = %topic,
                        subscriber_id = *subscriber_id,
                        "[Broker] Queue closed, skipping subscriber"
                    );
                }
            }
        }

        delivered
    }

    /// Subscribe to every topic in `topics` and return a guard that
    /// unsubscribes from all of them when dropped
    pub fn join(
        self: &Arc<Self>,
        subscriber: &Subscriber<E>,
        topics: impl IntoIterator<Item = Topic>,
    ) -> Subscription<E> {
        let mut joined: Vec<Topic> = Vec::new();
        for topic in topics {
            if joined.contains(&topic) {
                continue;
            }
            self.subscribe(&topic, subscriber);
            joined.push(topic);
        }

        Subscription {
            broker: self.clone(),
            subscriber_id: subscriber.id,
            topics: joined,
        }
    }

    /// Number of topics with at least one subscriber
    pub fn topic_count(&self) -> usize {
        self.topics.read().len()
    }

    /// Number of subscribers registered under `topic`
    pub fn subscriber_count(&self, topic: &Topic) -> usize {
        self.topics
            .read()
            .get(&topic.key())
            .map(HashMap::len)
            .unwrap_or(0)
    }
}

impl<E> Default for Broker<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped set of topic registrations for one subscriber
///
/// Dropping the guard unsubscribes from every joined topic, so every exit
/// path of the owner (return, error, panic, task abort) cleans up.
pub struct Subscription<E> {
    broker: Arc<Broker<E>>,
    subscriber_id: SubscriberId,
    topics: Vec<Topic>,
}

impl<E> Subscription<E> {
    pub fn subscriber_id(&self) -> SubscriberId {
        self.subscriber_id
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }
}

impl<E> Drop for Subscription<E> {
    fn drop(&mut self) {
        for topic in self.topics.drain(..) {
            self.broker.unsubscribe(&topic, self.subscriber_id);
        }
    }
}

// ============================================================================
// Sync event specialisation
// ============================================================================

/// Broker carrying sync events
pub type SyncBroker = Broker<SyncEvent>;

/// Shared broker, injected into services and the gateway
pub type SharedBroker = Arc<SyncBroker>;

/// Create a new shared broker
pub fn create_shared_broker(capacity: usize) -> SharedBroker {
    Arc::new(SyncBroker::with_capacity(capacity))
}

/// Event Publisher - used by mutation services to publish committed changes
///
/// Routes each event to the topic derived from its scope ids.
/// Cheaply cloneable.
#[derive(Clone)]
pub struct EventPublisher {
    broker: SharedBroker,
}

impl EventPublisher {
    pub fn new(broker: SharedBroker) -> Self {
        Self { broker }
    }

    /// Publish an event on its topic
    ///
    /// Returns the number of subscribers that received it (0 is not an error).
    pub fn publish(&self, event: SyncEvent) -> usize {
        let topic = event.topic();
        let type_name = event.type_name();
        let delivered = self.broker.publish(&topic, event);

        debug!(
            event_type = type_name,
            topic = %topic,
            receivers = delivered,
            "[Broker] Published event"
        );

        delivered
    }

    pub fn broker(&self) -> &SharedBroker {
        &self.broker
    }
}
