use sentinel::config::Config;
use sentinel::notify::{Notifier, TelegramNotifier};
use sentinel::services::{
    MarketScanner, ScanScheduler, SeriesCache, SqliteStore, TickerAnalyzer,
};
use sentinel::sources::{PriceProvider, YahooFinanceClient};
use sentinel::{api, AppState};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sentinel=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env());
    info!("Starting Sentinel server on {}:{}", config.host, config.port);

    // Open persistent storage
    let store = Arc::new(SqliteStore::new(&config.database_path)?);

    // Build the scan pipeline: provider -> cache -> analyzer -> scanner
    let cache = Arc::new(SeriesCache::new(Duration::from_secs(
        config.series_cache_ttl_secs,
    )));
    let provider: Arc<dyn PriceProvider> =
        Arc::new(YahooFinanceClient::new(config.fetch.clone()));
    let analyzer = Arc::new(TickerAnalyzer::new(provider, cache.clone()));
    let scanner = Arc::new(MarketScanner::new(analyzer, config.scan_concurrency));

    // Warm the latest-result slot from the last persisted pass
    let latest = Arc::new(RwLock::new(None));
    if let Some(result) = store.load_last_scan_result()? {
        info!(
            "Loaded previous scan: {} records from {}",
            result.len(),
            result.completed_at
        );
        *latest.write().unwrap() = Some(result);
    }

    // Scheduler wiring (started on demand through the API)
    let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::new(store.clone()));
    let scheduler = Arc::new(ScanScheduler::new(
        scanner.clone(),
        store.clone(),
        notifier,
        latest.clone(),
    ));

    // Periodic sweep of expired series cache entries
    {
        let cache = cache.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(300)).await;
                cache.cleanup();
            }
        });
    }

    // Create application state
    let state = AppState {
        config: config.clone(),
        store,
        scanner,
        scheduler,
        latest,
    };

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the router
    let app = axum::Router::new()
        .merge(api::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start the server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Sentinel server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
