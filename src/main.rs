use anyhow::Context;
use price_tracker::{
    AppState,
    config::AppConfig,
    jobs::price_ingestion::PriceIngestionJob,
    router::build_router,
    services::price_feed::BinanceTickerFeed,
    store::SeaOrmStore,
};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,price_tracker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env().context("Invalid configuration")?;

    tracing::info!(
        feed_url = %config.feed.base_url,
        quote = %config.feed.quote_currency,
        "Price feed configured"
    );

    // Connect to database
    tracing::info!("Connecting to database...");
    let store = SeaOrmStore::connect(&config.database)
        .await
        .context("Failed to connect to database")?;

    // Run migrations
    tracing::info!("Running migrations...");
    migration::Migrator::up(store.connection(), None)
        .await
        .context("Failed to run migrations")?;

    let store = Arc::new(store);

    let feed = BinanceTickerFeed::new(&config.feed.base_url, config.feed.fetch_timeout)
        .context("Failed to build price feed client")?;
    let ingestion = PriceIngestionJob::new(store.clone(), Arc::new(feed), &config.feed).spawn();

    let app = build_router(AppState::new(store));

    // Start server
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    ingestion.stop().await;
    served.context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
