use std::sync::Arc;

use postworks::api;
use postworks::broker::{Broker, topology};
use postworks::config::Config;
use postworks::post::{BrokerEventPublisher, MemoryPostStore, PostService, ResultConsumer};
use postworks::post::consumer as result_consumer;
use postworks::processor::{self, PriceCalculator, ProcessingEngine, ProcessorConsumer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = Config::from_env()?;

    eprintln!("postworks v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://0.0.0.0:{}/v1/api/posts", config.port);
    eprintln!("   Rate: {} per word", config.price_per_word);
    eprintln!(
        "   Broker: {} workers/queue, {} redeliveries before DLQ",
        config.workers, config.max_redeliveries
    );

    // ── Broker topology ─────────────────────────────────────────────────
    let broker = Broker::new(config.max_redeliveries);
    topology::declare(&broker)?;

    // ── Post service ────────────────────────────────────────────────────
    let store = MemoryPostStore::new();
    let publisher = BrokerEventPublisher::new(Arc::clone(&broker));
    let posts = PostService::new(store, publisher);

    // ── Text processor ──────────────────────────────────────────────────
    let engine = Arc::new(ProcessingEngine::new(PriceCalculator::new(
        config.price_per_word,
    )));
    let processor = ProcessorConsumer::new(Arc::clone(&broker), engine)?;
    let _processor_workers = processor::spawn_workers(processor, config.workers);

    // ── Result consumer ─────────────────────────────────────────────────
    let results = ResultConsumer::new(&broker, Arc::clone(&posts))?;
    let _result_workers = result_consumer::spawn_workers(results, config.workers);

    // ── Startup recovery: republish requests for unprocessed posts ──────
    let recovered = posts.recover_unprocessed().await?;
    if recovered > 0 {
        eprintln!("   Recovered {recovered} unprocessed posts");
    }

    // ── HTTP API ────────────────────────────────────────────────────────
    let app = api::routes(posts);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "HTTP API listening");
    axum::serve(listener, app).await?;

    Ok(())
}
