use std::sync::Arc;

use songsync_core::{demo_tracks, MemoryCatalog};

use crate::config::Config;
use crate::service::{SyncOptions, SyncService};
use crate::ws::hub::ConnectionHub;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SyncService>,
}

impl AppState {
    pub fn new(service: SyncService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// Build the service described by `config`.
    pub fn from_config(config: &Config) -> Self {
        let store = if config.seed_demo {
            MemoryCatalog::with_tracks(demo_tracks())
        } else {
            MemoryCatalog::new()
        };
        let hub = Arc::new(ConnectionHub::new(config.channel_capacity));
        let options = SyncOptions {
            event_name: config.event_name.clone(),
            broadcast_on_list: config.broadcast_on_list,
        };
        Self::new(SyncService::new(store, hub, options))
    }
}
