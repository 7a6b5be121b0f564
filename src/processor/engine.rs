//! Processing engine — composes word counting and pricing into one
//! request → result transformation. Pure and deterministic, so running it
//! twice for a redelivered request is always safe.

use tracing::debug;

use crate::messages::{ProcessingRequest, ProcessingResult};

use super::pricing::PriceCalculator;
use super::words::count_words;

pub struct ProcessingEngine {
    calculator: PriceCalculator,
}

impl ProcessingEngine {
    pub fn new(calculator: PriceCalculator) -> Self {
        Self { calculator }
    }

    /// Compute word count and price for a request.
    pub fn process(&self, request: &ProcessingRequest) -> ProcessingResult {
        let word_count = count_words(&request.post_body);
        let price = self.calculator.price(word_count);

        debug!(
            post_id = %request.post_id,
            word_count,
            price = %price,
            "Processed post body"
        );

        ProcessingResult {
            post_id: request.post_id,
            word_count,
            price,
        }
    }
}

impl Default for ProcessingEngine {
    fn default() -> Self {
        Self::new(PriceCalculator::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn request(body: &str) -> ProcessingRequest {
        ProcessingRequest {
            post_id: Uuid::new_v4(),
            post_body: body.into(),
        }
    }

    #[test]
    fn hello_world_at_default_rate() {
        let engine = ProcessingEngine::default();
        let result = engine.process(&request("Hello world"));
        assert_eq!(result.word_count, 2);
        assert_eq!(result.price, dec!(0.20));
    }

    #[test]
    fn result_carries_the_request_id() {
        let engine = ProcessingEngine::default();
        let req = request("one two three");
        assert_eq!(engine.process(&req).post_id, req.post_id);
    }

    #[test]
    fn deterministic_across_runs() {
        let engine = ProcessingEngine::default();
        let req = request("the same body every time");
        let first = engine.process(&req);
        let second = engine.process(&req);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_body_is_free() {
        let engine = ProcessingEngine::default();
        let result = engine.process(&request("   "));
        assert_eq!(result.word_count, 0);
        assert_eq!(result.price, dec!(0.00));
    }
}
