//! Pricing — fixed per-word rate, two decimal places, half-up.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Default rate charged per word.
pub const DEFAULT_PRICE_PER_WORD: Decimal = dec!(0.10);

/// Calculates the price of a post from its word count.
#[derive(Debug, Clone)]
pub struct PriceCalculator {
    price_per_word: Decimal,
}

impl PriceCalculator {
    pub fn new(price_per_word: Decimal) -> Self {
        Self { price_per_word }
    }

    /// `word_count × rate`, rounded to 2 decimal places with ties away
    /// from zero (round-half-up for the non-negative amounts we produce).
    pub fn price(&self, word_count: u32) -> Decimal {
        (self.price_per_word * Decimal::from(word_count))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

impl Default for PriceCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_PRICE_PER_WORD)
    }
}
