use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use songsync_core::DEFAULT_SNAPSHOT_EVENT;
use songsync_viewer::{subscribe, ws_url, CatalogClient};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    let server_url = std::env::var("SONGSYNC_SERVER_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:3000".to_string());
    let event_name = std::env::var("SONGSYNC_EVENT_NAME")
        .unwrap_or_else(|_| DEFAULT_SNAPSHOT_EVENT.to_string());

    let client = CatalogClient::new(&server_url);
    let tracks = client.fetch_catalog().await;
    tracing::info!("Catalog at {} has {} tracks", client.base_url(), tracks.len());

    let mut subscription = subscribe(ws_url(&server_url), event_name);
    while let Some(snapshot) = subscription.next_snapshot().await {
        tracing::info!("Snapshot: {} tracks", snapshot.len());
        for track in &snapshot {
            tracing::info!("  #{} {} - {} ({})", track.id, track.title, track.artist, track.album);
        }
    }
}
