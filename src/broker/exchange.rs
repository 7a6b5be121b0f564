//! Direct exchange — routes published payloads to bound queues by key.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use super::queue::{Delivery, MessageQueue};

/// Named direct exchange.
///
/// Every queue bound under a routing key receives its own copy of each
/// message published with that key. A publish with no matching binding is
/// dropped with a warning, mirroring AMQP's non-mandatory publish.
pub struct Exchange {
    name: String,
    bindings: RwLock<HashMap<String, Vec<Arc<MessageQueue>>>>,
}

impl Exchange {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bindings: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bind a queue under a routing key. Idempotent per (key, queue) pair.
    pub fn bind(&self, routing_key: &str, queue: Arc<MessageQueue>) {
        let mut bindings = self.bindings.write().expect("exchange lock poisoned");
        let bound = bindings.entry(routing_key.to_string()).or_default();
        if bound.iter().any(|q| q.name() == queue.name()) {
            return;
        }
        debug!(
            exchange = %self.name,
            routing_key,
            queue = %queue.name(),
            "Queue bound"
        );
        bound.push(queue);
    }

    /// Route a payload to every queue bound under the routing key.
    pub fn publish(&self, routing_key: &str, payload: Vec<u8>) {
        let bindings = self.bindings.read().expect("exchange lock poisoned");
        match bindings.get(routing_key) {
            Some(queues) if !queues.is_empty() => {
                for queue in queues {
                    queue.enqueue(Delivery {
                        payload: payload.clone(),
                        routing_key: routing_key.to_string(),
                        redeliveries: 0,
                    });
                }
            }
            _ => {
                warn!(
                    exchange = %self.name,
                    routing_key,
                    "No binding for routing key, message dropped"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::queue::QueueOptions;

    fn queue(name: &str) -> Arc<MessageQueue> {
        Arc::new(MessageQueue::new(name, QueueOptions::default(), 3))
    }

    #[test]
    fn routes_by_key() {
        let exchange = Exchange::new("x.test");
        let created = queue("q.created");
        let resulted = queue("q.resulted");
        exchange.bind("post.created", Arc::clone(&created));
        exchange.bind("post.resulted", Arc::clone(&resulted));

        exchange.publish("post.created", b"a".to_vec());

        assert_eq!(created.len(), 1);
        assert!(resulted.is_empty());
    }

    #[test]
    fn fans_out_to_every_bound_queue() {
        let exchange = Exchange::new("x.test");
        let first = queue("q.first");
        let second = queue("q.second");
        exchange.bind("post.created", Arc::clone(&first));
        exchange.bind("post.created", Arc::clone(&second));

        exchange.publish("post.created", b"a".to_vec());

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn duplicate_bind_is_idempotent() {
        let exchange = Exchange::new("x.test");
        let q = queue("q.only");
        exchange.bind("post.created", Arc::clone(&q));
        exchange.bind("post.created", Arc::clone(&q));

        exchange.publish("post.created", b"a".to_vec());
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn unbound_key_drops_message() {
        let exchange = Exchange::new("x.test");
        let q = queue("q.other");
        exchange.bind("post.created", Arc::clone(&q));

        exchange.publish("post.deleted", b"a".to_vec());
        assert!(q.is_empty());
    }
}
