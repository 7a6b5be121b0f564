//! Message queue — durable-named FIFO with explicit ack/nack and
//! dead-letter routing.
//!
//! Delivery contract: at-least-once. A delivery handed to a consumer is
//! owned by that consumer until it is acked (dropped) or nacked
//! (requeued, or dead-lettered once the redelivery budget is spent).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;
use tracing::{debug, warn};

use super::exchange::Exchange;

/// Dead-letter target attached to a queue at declaration time.
#[derive(Clone)]
pub struct DeadLetterTarget {
    pub exchange: Arc<Exchange>,
    pub routing_key: String,
}

/// Declaration options for a queue.
///
/// `durable` is recorded for topology fidelity; an in-process broker has
/// no storage to survive process death, so it changes nothing at runtime.
#[derive(Clone, Default)]
pub struct QueueOptions {
    pub durable: bool,
    pub dead_letter: Option<DeadLetterTarget>,
}

/// A single message handed to a consumer.
#[derive(Debug, Clone)]
pub struct Delivery {
    /// Raw payload as published.
    pub payload: Vec<u8>,
    /// Routing key the message was published with.
    pub routing_key: String,
    /// How many times this message was requeued after a nack.
    pub redeliveries: u32,
}

struct QueueState {
    ready: VecDeque<Delivery>,
    closed: bool,
}

/// FIFO queue with blocking receive and explicit acknowledgement.
pub struct MessageQueue {
    name: String,
    state: Mutex<QueueState>,
    notify: Notify,
    options: QueueOptions,
    max_redeliveries: u32,
}

impl MessageQueue {
    pub(super) fn new(name: impl Into<String>, options: QueueOptions, max_redeliveries: u32) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(QueueState {
                ready: VecDeque::new(),
                closed: false,
            }),
            notify: Notify::new(),
            options,
            max_redeliveries,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enqueue a delivery. Called by the exchange on publish.
    pub(super) fn enqueue(&self, delivery: Delivery) {
        {
            let mut state = self.lock();
            if state.closed {
                warn!(queue = %self.name, "Dropping delivery to closed queue");
                return;
            }
            state.ready.push_back(delivery);
        }
        self.notify.notify_one();
    }

    /// Receive the next delivery, waiting until one is available.
    ///
    /// Returns `None` once the queue is closed and drained. Any number of
    /// workers may call this concurrently; each delivery goes to exactly
    /// one of them.
    pub async fn recv(&self) -> Option<Delivery> {
        loop {
            {
                let mut state = self.lock();
                if let Some(delivery) = state.ready.pop_front() {
                    return Some(delivery);
                }
                if state.closed {
                    return None;
                }
            }
            self.notify.notified().await;
        }
    }

    /// Pop the next delivery without waiting. Used for inspection (DLQ).
    pub fn try_recv(&self) -> Option<Delivery> {
        self.lock().ready.pop_front()
    }

    /// Acknowledge a delivery: processing succeeded, the message is done.
    pub fn ack(&self, delivery: Delivery) {
        debug!(
            queue = %self.name,
            routing_key = %delivery.routing_key,
            "Delivery acked"
        );
    }

    /// Negatively acknowledge a delivery.
    ///
    /// Requeues at the front (so redelivery is prompt) until the
    /// redelivery budget is exhausted, then routes the payload to the
    /// dead-letter target. Without a target the message is dropped with a
    /// warning.
    pub fn nack(&self, mut delivery: Delivery) {
        if delivery.redeliveries < self.max_redeliveries {
            delivery.redeliveries += 1;
            debug!(
                queue = %self.name,
                routing_key = %delivery.routing_key,
                redeliveries = delivery.redeliveries,
                "Delivery nacked, requeueing"
            );
            {
                let mut state = self.lock();
                if state.closed {
                    return;
                }
                state.ready.push_front(delivery);
            }
            self.notify.notify_one();
            return;
        }

        match &self.options.dead_letter {
            Some(target) => {
                warn!(
                    queue = %self.name,
                    routing_key = %delivery.routing_key,
                    dlx = %target.exchange.name(),
                    "Redelivery budget exhausted, dead-lettering"
                );
                target.exchange.publish(&target.routing_key, delivery.payload);
            }
            None => {
                warn!(
                    queue = %self.name,
                    routing_key = %delivery.routing_key,
                    "Redelivery budget exhausted and no dead-letter target, dropping"
                );
            }
        }
    }

    /// Close the queue: pending deliveries drain, then `recv` returns `None`.
    pub fn close(&self) {
        self.lock().closed = true;
        self.notify.notify_waiters();
    }

    /// Number of deliveries waiting in the queue.
    pub fn len(&self) -> usize {
        self.lock().ready.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().ready.is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, QueueState> {
        self.state.lock().expect("queue mutex poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    fn delivery(payload: &[u8]) -> Delivery {
        Delivery {
            payload: payload.to_vec(),
            routing_key: "post.created".into(),
            redeliveries: 0,
        }
    }

    fn queue(max_redeliveries: u32) -> MessageQueue {
        MessageQueue::new("q.test", QueueOptions::default(), max_redeliveries)
    }

    #[tokio::test]
    async fn enqueue_then_recv() {
        let q = queue(3);
        q.enqueue(delivery(b"one"));
        q.enqueue(delivery(b"two"));

        assert_eq!(q.recv().await.unwrap().payload, b"one");
        assert_eq!(q.recv().await.unwrap().payload, b"two");
        assert!(q.is_empty());
    }

    #[tokio::test]
    async fn recv_wakes_on_enqueue() {
        let q = Arc::new(queue(3));
        let waiter = Arc::clone(&q);
        let handle = tokio::spawn(async move { waiter.recv().await });

        // Give the waiter time to park before publishing.
        tokio::time::sleep(Duration::from_millis(10)).await;
        q.enqueue(delivery(b"late"));

        let got = timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();
        assert_eq!(got.unwrap().payload, b"late");
    }

    #[tokio::test]
    async fn nack_requeues_until_budget_spent() {
        let q = queue(2);
        q.enqueue(delivery(b"flaky"));

        for expected in 1..=2 {
            let d = q.recv().await.unwrap();
            q.nack(d);
            let d = q.try_recv().unwrap();
            assert_eq!(d.redeliveries, expected);
            // Put it back for the next round.
            q.enqueue(d);
        }

        // Budget spent, no dead-letter target configured: dropped.
        let d = q.recv().await.unwrap();
        q.nack(d);
        assert!(q.is_empty());
    }

    #[tokio::test]
    async fn exhausted_nack_routes_to_dead_letter_queue() {
        let dlx = Arc::new(Exchange::new("dlx.test"));
        let dlq = Arc::new(MessageQueue::new("q.dlq", QueueOptions::default(), 0));
        dlx.bind("dlq", Arc::clone(&dlq));

        let q = MessageQueue::new(
            "q.content",
            QueueOptions {
                durable: true,
                dead_letter: Some(DeadLetterTarget {
                    exchange: Arc::clone(&dlx),
                    routing_key: "dlq".into(),
                }),
            },
            0,
        );

        q.enqueue(delivery(b"poison"));
        let d = q.recv().await.unwrap();
        q.nack(d);

        assert!(q.is_empty());
        let dead = dlq.try_recv().unwrap();
        assert_eq!(dead.payload, b"poison");
    }

    #[tokio::test]
    async fn close_drains_then_ends() {
        let q = queue(3);
        q.enqueue(delivery(b"last"));
        q.close();

        assert!(q.recv().await.is_some());
        assert!(q.recv().await.is_none());
    }
}
