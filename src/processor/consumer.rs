//! Text-processor consumer — drains the processing-request queue, runs
//! the engine, and publishes results back onto the exchange.
//!
//! Failure handling is deliberately thin: any error (undecodable payload,
//! publish failure) nacks the delivery and lets the broker's redelivery
//! and dead-letter machinery take over. The consumer keeps no retry state
//! of its own.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::broker::topology::{EXCHANGE_POST_PROCESS, QUEUE_TEXT_PROCESSOR};
use crate::broker::{Broker, Delivery, MessageQueue};
use crate::error::{PipelineError, Result};
use crate::messages::{self, KEY_POST_RESULTED, ProcessingRequest};

use super::engine::ProcessingEngine;

pub struct ProcessorConsumer {
    broker: Arc<Broker>,
    engine: Arc<ProcessingEngine>,
    queue: Arc<MessageQueue>,
}

impl ProcessorConsumer {
    /// Attach to the processing-request queue. The topology must already
    /// be declared.
    pub fn new(broker: Arc<Broker>, engine: Arc<ProcessingEngine>) -> Result<Arc<Self>> {
        let queue = broker.queue(QUEUE_TEXT_PROCESSOR)?;
        Ok(Arc::new(Self {
            broker,
            engine,
            queue,
        }))
    }

    /// Consume deliveries until the queue closes.
    pub async fn run(&self) {
        while let Some(delivery) = self.queue.recv().await {
            match self.handle(&delivery) {
                Ok(post_id) => {
                    info!(%post_id, "Processing result published");
                    self.queue.ack(delivery);
                }
                Err(e) => {
                    error!(
                        error = %e,
                        redeliveries = delivery.redeliveries,
                        "Failed to process request, nacking"
                    );
                    self.queue.nack(delivery);
                }
            }
        }
    }

    /// Decode → compute → publish. Returns the post id on success.
    fn handle(&self, delivery: &Delivery) -> std::result::Result<uuid::Uuid, PipelineError> {
        let request: ProcessingRequest = messages::decode(&delivery.payload)
            .map_err(|e| PipelineError::Decode(e.to_string()))?;

        let result = self.engine.process(&request);

        let payload = messages::encode(&result).map_err(PipelineError::ResultPublish)?;
        self.broker
            .publish(EXCHANGE_POST_PROCESS, KEY_POST_RESULTED, payload)
            .map_err(PipelineError::ResultPublish)?;

        Ok(result.post_id)
    }
}

/// Spawn `workers` consumer tasks sharing one queue. Each delivery is
/// handled by exactly one of them.
pub fn spawn_workers(consumer: Arc<ProcessorConsumer>, workers: usize) -> Vec<JoinHandle<()>> {
    (0..workers)
        .map(|_| {
            let consumer = Arc::clone(&consumer);
            tokio::spawn(async move { consumer.run().await })
        })
        .collect()
}
