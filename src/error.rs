//! Error types for postworks.

use uuid::Uuid;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Broker error: {0}")]
    Broker(#[from] BrokerError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Broker-related errors.
///
/// `ExchangeNotFound` / `QueueNotFound` are the transient-infrastructure
/// class: a publish against missing topology is surfaced to the caller,
/// never retried inside the broker.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("Exchange {0} not declared")]
    ExchangeNotFound(String),

    #[error("Queue {0} not declared")]
    QueueNotFound(String),

    #[error("Queue {queue} conflicts with an existing declaration: {message}")]
    DeclarationConflict { queue: String, message: String },

    #[error("Message codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Post {0} not found")]
    NotFound(Uuid),

    #[error("Query failed: {0}")]
    Query(String),
}

/// Errors inside the consumer loops (decode, downstream publish, store apply).
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Failed to decode delivery payload: {0}")]
    Decode(String),

    #[error("Failed to publish result: {0}")]
    ResultPublish(#[from] BrokerError),

    #[error("Failed to apply result: {0}")]
    ResultApply(#[from] StoreError),
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
