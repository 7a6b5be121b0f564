//! Postworks — post submission with asynchronous text processing.
//!
//! A post service accepts submissions over HTTP, persists them, and hands
//! the body to a stateless text processor through a broker. The processor
//! computes a word count and a price and publishes the result back; a
//! result consumer applies it to the stored post. Delivery is
//! at-least-once with dead-lettering for poison messages.

pub mod api;
pub mod broker;
pub mod config;
pub mod error;
pub mod messages;
pub mod post;
pub mod processor;
