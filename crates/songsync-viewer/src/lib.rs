//! SongSync Viewer - fetch and follow the catalog of a SongSync server.
//!
//! Viewers never fail loudly: an unreachable server shows up as an empty
//! catalog.

pub mod client;
pub mod error;
pub mod subscription;

pub use client::CatalogClient;
pub use error::ViewerError;
pub use subscription::{subscribe, ws_url, Subscription};
