pub mod config;
pub mod error;
pub mod routes;
pub mod service;
pub mod state;
pub mod ws;

pub use config::Config;
pub use error::ApiError;
pub use routes::create_router;
pub use service::{SyncOptions, SyncService};
pub use state::AppState;
pub use ws::{ConnectionHub, ViewerQueue};
