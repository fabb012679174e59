//! SongSync Core - Track model, catalog store and wire messages.
//!
//! This crate holds the domain types shared by the sync server and viewers.
//! It has no dependencies on other SongSync crates.

pub mod error;
pub mod messages;
pub mod store;
pub mod track;

pub use error::CatalogError;
pub use messages::{ClientMessage, ServerMessage, DEFAULT_SNAPSHOT_EVENT};
pub use store::{demo_tracks, CatalogStore, MemoryCatalog};
pub use track::{NewTrack, Track, TrackPatch};
