use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use songsync::{create_router, AppState, Config};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!("Optional: SONGSYNC_LISTEN_ADDR (default: 0.0.0.0:3000)");
            eprintln!("Optional: SONGSYNC_EVENT_NAME (default: updateMusicList)");
            eprintln!("Optional: SONGSYNC_BROADCAST_ON_LIST, SONGSYNC_SEED_DEMO, SONGSYNC_CHANNEL_CAPACITY");
            std::process::exit(1);
        }
    };

    tracing::info!("Starting SongSync server");
    tracing::info!("Listen address: {}", config.listen_addr);
    tracing::info!("Snapshot event: {}", config.event_name);

    let state = AppState::from_config(&config);
    tracing::info!("Catalog holds {} tracks", state.service.track_count().await);

    let app = create_router(state);

    let listener = match tokio::net::TcpListener::bind(&config.listen_addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", config.listen_addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server running at http://{}", config.listen_addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
