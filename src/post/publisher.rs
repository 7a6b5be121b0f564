//! Post-created event publication.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::broker::Broker;
use crate::broker::topology::EXCHANGE_POST_PROCESS;
use crate::error::BrokerError;
use crate::messages::{self, KEY_POST_CREATED, ProcessingRequest};

use super::model::Post;

/// Seam between the post service and the broker, so the service can be
/// tested against a recording stub.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Emit a processing request for a freshly saved post.
    async fn publish_post_created(&self, post: &Post) -> Result<(), BrokerError>;
}

/// Publishes processing requests onto the post-processing exchange.
pub struct BrokerEventPublisher {
    broker: Arc<Broker>,
}

impl BrokerEventPublisher {
    pub fn new(broker: Arc<Broker>) -> Arc<Self> {
        Arc::new(Self { broker })
    }
}

#[async_trait]
impl EventPublisher for BrokerEventPublisher {
    async fn publish_post_created(&self, post: &Post) -> Result<(), BrokerError> {
        let request = ProcessingRequest {
            post_id: post.id,
            post_body: post.body.clone(),
        };
        let payload = messages::encode(&request)?;
        self.broker
            .publish(EXCHANGE_POST_PROCESS, KEY_POST_CREATED, payload)?;
        info!(post_id = %post.id, "Published post-created event");
        Ok(())
    }
}
