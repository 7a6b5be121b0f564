//! Post service — submission, persistence and asynchronous enrichment.

pub mod consumer;
pub mod model;
pub mod publisher;
pub mod service;
pub mod store;

pub use consumer::ResultConsumer;
pub use model::{Post, PostDraft};
pub use publisher::{BrokerEventPublisher, EventPublisher};
pub use service::PostService;
pub use store::{MemoryPostStore, PostPage, PostStore};
