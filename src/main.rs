use std::sync::Arc;

use anyhow::Context;
use axum::http::HeaderValue;
use tracing_subscriber::EnvFilter;

use steampal_api::{
    config::Config,
    db::{create_pool, create_redis_client, Cache, PgStore},
    routes::{create_router, AppState},
    services::{
        providers::{CachedCatalog, GeminiProvider, RetryPolicy, SteamStoreCatalog, SteamWebLibrary},
        RecommendationService, Recommender,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("steampal_api=debug,tower_http=debug")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    let redis_client = create_redis_client(&config.redis_url)?;
    let (cache, cache_writer) = Cache::new(redis_client);

    let store_catalog = SteamStoreCatalog::new(
        config.steam_store_url.clone(),
        config.http_timeout(),
        RetryPolicy {
            max_attempts: config.catalog_max_attempts,
            base_delay: config.catalog_backoff(),
        },
    )?;
    let catalog = Arc::new(CachedCatalog::new(Arc::new(store_catalog), cache.clone()));

    let library = SteamWebLibrary::new(
        cache,
        config.steam_api_key.clone(),
        config.steam_api_url.clone(),
        config.http_timeout(),
    )?;

    let generator = GeminiProvider::new(
        config.gemini_api_key.clone(),
        config.gemini_api_url.clone(),
        config.gemini_model.clone(),
        config.http_timeout(),
    )?;

    let store = Arc::new(PgStore::new(pool));
    let recommender = Recommender::new(
        Arc::new(generator),
        catalog.clone(),
        config.max_recommendation_attempts,
    );

    let state = Arc::new(AppState {
        recommendations: RecommendationService::new(
            Arc::new(library),
            catalog,
            store.clone(),
            store,
            recommender,
        ),
    });

    let cors_origin = HeaderValue::from_str(&config.cors_origin)
        .with_context(|| format!("Invalid CORS_ORIGIN: {}", config.cors_origin))?;
    let app = create_router(state, cors_origin);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        addr = %addr,
        model = %config.gemini_model,
        max_attempts = config.max_recommendation_attempts,
        "Steam Pal API listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cache_writer.shutdown().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
