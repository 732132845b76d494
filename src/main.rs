use std::sync::Arc;

use steamrec_api::{
    config::Config,
    db::{self, Cache},
    routes::{create_router, AppState},
    services::{
        providers::SteamClient,
        recommendations::FriendFetchSettings,
        recommender::{CatalogIndex, Recommender},
    },
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("steamrec_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    // Build the catalog index once; it is read-only for the life of the process
    let pool = db::create_pool(&config.database_url).await?;
    let rows = db::load_catalog(&pool).await?;
    pool.close().await;
    let index = CatalogIndex::from_rows(rows, config.max_features)?;
    let recommender = Arc::new(Recommender::new(index));

    let redis_client = db::create_redis_client(&config.redis_url)?;
    let (cache, cache_handle) = Cache::new(redis_client);
    let steam = SteamClient::new(cache, config.steam_api_key.clone(), config.steam_api_url.clone())?;

    let state = Arc::new(AppState {
        recommender,
        steam: Arc::new(steam),
        friend_fetch: FriendFetchSettings {
            friend_limit: config.steam_friend_limit,
            max_workers: config.max_friend_workers,
        },
    });

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cache_handle.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
