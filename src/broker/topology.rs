//! Post-processing topology — exchange, queues, bindings and dead-letter
//! wiring, declared idempotently before any consumer attaches.

use tracing::info;

use crate::error::BrokerError;
use crate::messages::{KEY_POST_CREATED, KEY_POST_RESULTED};

use super::{Broker, DeadLetterSpec};

/// Exchange the post service and text processor communicate over.
pub const EXCHANGE_POST_PROCESS: &str = "post-processing-exchange.v1.e";

/// Dead-letter exchange for both content queues.
pub const DLX_POST_PROCESS: &str = "post-processing-dlx";

/// Queue the text processor consumes processing requests from.
pub const QUEUE_TEXT_PROCESSOR: &str = "text-processor-service.post-processing.v1.q";

/// Queue the post service consumes processing results from.
pub const QUEUE_POST_SERVICE: &str = "post-service.post-processing-result.v1.q";

/// Holding queue for rejected deliveries. No consumer — inspection only.
pub const QUEUE_DEAD_LETTER: &str = "text-processor-service.post-processing.v1.dlq";

/// Routing key for dead-lettered messages.
pub const KEY_DLQ: &str = "dlq";

/// Declare the full topology. Safe to run on every boot.
pub fn declare(broker: &Broker) -> Result<(), BrokerError> {
    broker.declare_exchange(EXCHANGE_POST_PROCESS);
    broker.declare_exchange(DLX_POST_PROCESS);

    let dead_letter = Some(DeadLetterSpec {
        exchange: DLX_POST_PROCESS.to_string(),
        routing_key: KEY_DLQ.to_string(),
    });

    broker.declare_queue(QUEUE_TEXT_PROCESSOR, true, dead_letter.clone())?;
    broker.declare_queue(QUEUE_POST_SERVICE, true, dead_letter)?;
    broker.declare_queue(QUEUE_DEAD_LETTER, true, None)?;

    broker.bind(QUEUE_TEXT_PROCESSOR, EXCHANGE_POST_PROCESS, KEY_POST_CREATED)?;
    broker.bind(QUEUE_POST_SERVICE, EXCHANGE_POST_PROCESS, KEY_POST_RESULTED)?;
    broker.bind(QUEUE_DEAD_LETTER, DLX_POST_PROCESS, KEY_DLQ)?;

    info!(
        exchange = EXCHANGE_POST_PROCESS,
        dlx = DLX_POST_PROCESS,
        "Post-processing topology declared"
    );
    Ok(())
}
