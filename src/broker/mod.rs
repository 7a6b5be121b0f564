//! In-process message broker modeling an AMQP-style topology: named
//! direct exchanges, durable-named queues with dead-letter targets, and
//! at-least-once delivery with explicit ack/nack.

pub mod exchange;
pub mod queue;
pub mod topology;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::info;

pub use exchange::Exchange;
pub use queue::{DeadLetterTarget, Delivery, MessageQueue, QueueOptions};

use crate::error::BrokerError;

/// Dead-letter wiring requested at queue declaration, by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadLetterSpec {
    pub exchange: String,
    pub routing_key: String,
}

/// Registry of exchanges and queues.
///
/// All declaration methods are idempotent so startup topology setup can
/// run on every boot. Redeclaring a queue with different arguments is a
/// conflict, as it would be on a real broker.
pub struct Broker {
    exchanges: RwLock<HashMap<String, Arc<Exchange>>>,
    queues: RwLock<HashMap<String, (Arc<MessageQueue>, QueueSignature)>>,
    max_redeliveries: u32,
}

#[derive(PartialEq, Eq)]
struct QueueSignature {
    durable: bool,
    dead_letter: Option<DeadLetterSpec>,
}

impl Broker {
    pub fn new(max_redeliveries: u32) -> Arc<Self> {
        Arc::new(Self {
            exchanges: RwLock::new(HashMap::new()),
            queues: RwLock::new(HashMap::new()),
            max_redeliveries,
        })
    }

    /// Declare a direct exchange, returning the existing one if present.
    pub fn declare_exchange(&self, name: &str) -> Arc<Exchange> {
        let mut exchanges = self.exchanges.write().expect("broker lock poisoned");
        Arc::clone(exchanges.entry(name.to_string()).or_insert_with(|| {
            info!(exchange = name, "Exchange declared");
            Arc::new(Exchange::new(name))
        }))
    }

    /// Declare a queue.
    ///
    /// The dead-letter exchange, if named, must already be declared — the
    /// nack path holds a direct handle to it. Redeclaring with identical
    /// arguments returns the existing queue.
    pub fn declare_queue(
        &self,
        name: &str,
        durable: bool,
        dead_letter: Option<DeadLetterSpec>,
    ) -> Result<Arc<MessageQueue>, BrokerError> {
        let signature = QueueSignature {
            durable,
            dead_letter: dead_letter.clone(),
        };

        let mut queues = self.queues.write().expect("broker lock poisoned");
        if let Some((queue, existing)) = queues.get(name) {
            if *existing != signature {
                return Err(BrokerError::DeclarationConflict {
                    queue: name.to_string(),
                    message: "dead-letter or durability arguments differ".into(),
                });
            }
            return Ok(Arc::clone(queue));
        }

        let target = match dead_letter {
            Some(spec) => {
                let exchanges = self.exchanges.read().expect("broker lock poisoned");
                let exchange = exchanges
                    .get(&spec.exchange)
                    .cloned()
                    .ok_or_else(|| BrokerError::ExchangeNotFound(spec.exchange.clone()))?;
                Some(DeadLetterTarget {
                    exchange,
                    routing_key: spec.routing_key,
                })
            }
            None => None,
        };

        let queue = Arc::new(MessageQueue::new(
            name,
            QueueOptions {
                durable,
                dead_letter: target,
            },
            self.max_redeliveries,
        ));
        info!(queue = name, durable, "Queue declared");
        queues.insert(name.to_string(), (Arc::clone(&queue), signature));
        Ok(queue)
    }

    /// Bind a declared queue to a declared exchange under a routing key.
    pub fn bind(
        &self,
        queue: &str,
        exchange: &str,
        routing_key: &str,
    ) -> Result<(), BrokerError> {
        let queue = self.queue(queue)?;
        let exchange = self
            .exchanges
            .read()
            .expect("broker lock poisoned")
            .get(exchange)
            .cloned()
            .ok_or_else(|| BrokerError::ExchangeNotFound(exchange.to_string()))?;
        exchange.bind(routing_key, queue);
        Ok(())
    }

    /// Publish a payload to an exchange.
    ///
    /// Fails if the exchange was never declared; that failure is surfaced
    /// to the caller rather than retried here.
    pub fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        payload: Vec<u8>,
    ) -> Result<(), BrokerError> {
        let exchange = self
            .exchanges
            .read()
            .expect("broker lock poisoned")
            .get(exchange)
            .cloned()
            .ok_or_else(|| BrokerError::ExchangeNotFound(exchange.to_string()))?;
        exchange.publish(routing_key, payload);
        Ok(())
    }

    /// Look up a declared queue by name.
    pub fn queue(&self, name: &str) -> Result<Arc<MessageQueue>, BrokerError> {
        self.queues
            .read()
            .expect("broker lock poisoned")
            .get(name)
            .map(|(queue, _)| Arc::clone(queue))
            .ok_or_else(|| BrokerError::QueueNotFound(name.to_string()))
    }

    /// Close every queue, letting consumer loops drain and exit.
    pub fn close(&self) {
        for (queue, _) in self.queues.read().expect("broker lock poisoned").values() {
            queue.close();
        }
    }
}
