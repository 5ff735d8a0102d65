use std::{sync::Arc, time::Duration};

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reelmatch_api::{
    config::Config,
    db::{create_redis_client, Cache, Catalog, FavoritesStore},
    routes::{create_router, AppState},
    services::{providers::TmdbProvider, RecommendationEngine},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("reelmatch_api=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let catalog = Catalog::load(&config.catalog_path, &config.similarity_path)
        .context("Failed to load movie catalog")?;

    let (cache, cache_writer) = match &config.redis_url {
        Some(redis_url) => {
            let (cache, handle) = Cache::new(create_redis_client(redis_url)?);
            tracing::info!("Metadata cache enabled");
            (Some(cache), Some(handle))
        }
        None => {
            tracing::info!("REDIS_URL not set, metadata cache disabled");
            (None, None)
        }
    };

    let provider = TmdbProvider::new(
        cache,
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        config.tmdb_image_base_url.clone(),
        Duration::from_secs(config.tmdb_timeout_secs),
    )?;

    let state = Arc::new(AppState {
        engine: RecommendationEngine::new(Arc::new(catalog)),
        metadata_provider: Arc::new(provider),
        favorites: Arc::new(FavoritesStore::new(&config.favorites_path)),
        default_limit: config.default_limit,
        trending_count: config.trending_count,
    });

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(address = %addr, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_writer {
        handle.shutdown().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
