//! Text-processor service — stateless word count + pricing over the broker.

pub mod consumer;
pub mod engine;
pub mod pricing;
pub mod words;

pub use consumer::{ProcessorConsumer, spawn_workers};
pub use engine::ProcessingEngine;
pub use pricing::PriceCalculator;
pub use words::count_words;
