//! Result consumer — drains the result queue and applies word count and
//! price to the stored posts.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::error;

use crate::broker::topology::QUEUE_POST_SERVICE;
use crate::broker::{Broker, Delivery, MessageQueue};
use crate::error::{PipelineError, Result};
use crate::messages::{self, ProcessingResult};

use super::service::PostService;

pub struct ResultConsumer {
    service: Arc<PostService>,
    queue: Arc<MessageQueue>,
}

impl ResultConsumer {
    /// Attach to the result queue. The topology must already be declared.
    pub fn new(broker: &Broker, service: Arc<PostService>) -> Result<Arc<Self>> {
        let queue = broker.queue(QUEUE_POST_SERVICE)?;
        Ok(Arc::new(Self { service, queue }))
    }

    /// Consume deliveries until the queue closes.
    ///
    /// An undecodable payload or a store failure nacks the delivery; a
    /// result whose post no longer exists acks it as a no-op.
    pub async fn run(&self) {
        while let Some(delivery) = self.queue.recv().await {
            match self.handle(&delivery).await {
                Ok(()) => self.queue.ack(delivery),
                Err(e) => {
                    error!(
                        error = %e,
                        redeliveries = delivery.redeliveries,
                        "Failed to apply result, nacking"
                    );
                    self.queue.nack(delivery);
                }
            }
        }
    }

    async fn handle(&self, delivery: &Delivery) -> std::result::Result<(), PipelineError> {
        let result: ProcessingResult = messages::decode(&delivery.payload)
            .map_err(|e| PipelineError::Decode(e.to_string()))?;
        self.service
            .apply_result(&result)
            .await
            .map_err(PipelineError::ResultApply)
    }
}

/// Spawn `workers` result-consumer tasks sharing the result queue.
pub fn spawn_workers(consumer: Arc<ResultConsumer>, workers: usize) -> Vec<JoinHandle<()>> {
    (0..workers)
        .map(|_| {
            let consumer = Arc::clone(&consumer);
            tokio::spawn(async move { consumer.run().await })
        })
        .collect()
}
