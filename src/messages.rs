//! Wire messages exchanged between the post service and the text processor.
//!
//! Both records are transient: they live on the broker until a consumer
//! acknowledges them, and are never persisted. Payloads are JSON on the
//! wire so that an undecodable body is a poison message the consumer can
//! reject toward the dead-letter queue.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BrokerError;

/// Routing key for newly created posts awaiting processing.
pub const KEY_POST_CREATED: &str = "post.created";

/// Routing key for finished processing results.
pub const KEY_POST_RESULTED: &str = "post.resulted";

/// Request for the text processor: produced once per created post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingRequest {
    pub post_id: Uuid,
    pub post_body: String,
}

/// Result of processing: word count plus the computed price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub post_id: Uuid,
    pub word_count: u32,
    pub price: Decimal,
}

/// Encode a wire message as a JSON payload.
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, BrokerError> {
    Ok(serde_json::to_vec(message)?)
}

/// Decode a JSON payload back into a wire message.
pub fn decode<'a, T: Deserialize<'a>>(payload: &'a [u8]) -> Result<T, BrokerError> {
    Ok(serde_json::from_slice(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn request_round_trips_through_json() {
        let request = ProcessingRequest {
            post_id: Uuid::new_v4(),
            post_body: "Hello world".into(),
        };
        let payload = encode(&request).unwrap();
        let decoded: ProcessingRequest = decode(&payload).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn malformed_payload_is_a_codec_error() {
        let err = decode::<ProcessingResult>(b"not json at all").unwrap_err();
        assert!(matches!(err, BrokerError::Codec(_)));
    }

    #[test]
    fn price_survives_two_decimal_places() {
        let result = ProcessingResult {
            post_id: Uuid::new_v4(),
            word_count: 2,
            price: dec!(0.20),
        };
        let decoded: ProcessingResult = decode(&encode(&result).unwrap()).unwrap();
        assert_eq!(decoded.price, dec!(0.20));
    }
}
