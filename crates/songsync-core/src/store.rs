use crate::error::CatalogError;
use crate::track::{NewTrack, Track, TrackPatch};

/// Trait for the authoritative track collection.
///
/// Mutations take `&mut self`; callers that share a store across tasks are
/// expected to serialize access themselves.
pub trait CatalogStore: Send + Sync {
    /// All tracks in insertion order.
    fn list(&self) -> Vec<Track>;

    /// Get a track by id.
    fn get(&self, id: u64) -> Option<Track>;

    /// Append a new track and return it with its assigned id.
    fn create(&mut self, new: NewTrack) -> Result<Track, CatalogError>;

    /// Merge the present fields of `patch` into the track with this id.
    fn update(&mut self, id: u64, patch: TrackPatch) -> Result<Track, CatalogError>;

    /// Remove the track with this id and return it.
    fn delete(&mut self, id: u64) -> Result<Track, CatalogError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory catalog.
///
/// Ids come from a counter that only moves forward, so an id freed by a
/// delete is never handed out again. Once `u64::MAX` has been used,
/// `create` fails with [`CatalogError::IdsExhausted`].
#[derive(Debug, Clone)]
pub struct MemoryCatalog {
    tracks: Vec<Track>,
    next_id: Option<u64>,
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self {
            tracks: Vec::new(),
            next_id: Some(1),
        }
    }

    /// Start from an existing list of tracks. The counter resumes after the
    /// highest id present.
    pub fn with_tracks(tracks: Vec<Track>) -> Self {
        let next_id = tracks.iter().map(|t| t.id).max().unwrap_or(0).checked_add(1);
        Self { tracks, next_id }
    }

    fn position(&self, id: u64) -> Result<usize, CatalogError> {
        self.tracks
            .iter()
            .position(|t| t.id == id)
            .ok_or(CatalogError::NotFound(id))
    }
}

impl CatalogStore for MemoryCatalog {
    fn list(&self) -> Vec<Track> {
        self.tracks.clone()
    }

    fn get(&self, id: u64) -> Option<Track> {
        self.tracks.iter().find(|t| t.id == id).cloned()
    }

    fn create(&mut self, new: NewTrack) -> Result<Track, CatalogError> {
        let id = self.next_id.ok_or(CatalogError::IdsExhausted)?;
        let track = Track {
            id,
            title: new.title,
            artist: new.artist,
            album: new.album,
        };
        self.next_id = id.checked_add(1);
        self.tracks.push(track.clone());
        Ok(track)
    }

    fn update(&mut self, id: u64, patch: TrackPatch) -> Result<Track, CatalogError> {
        let index = self.position(id)?;
        let track = &mut self.tracks[index];
        track.apply(patch);
        Ok(track.clone())
    }

    fn delete(&mut self, id: u64) -> Result<Track, CatalogError> {
        let index = self.position(id)?;
        Ok(self.tracks.remove(index))
    }

    fn len(&self) -> usize {
        self.tracks.len()
    }
}

/// The three songs the service starts with in demo mode.
pub fn demo_tracks() -> Vec<Track> {
    (1..=3)
        .map(|n| {
            Track::new(
                n,
                format!("Song {}", n),
                format!("Artist {}", n),
                format!("Album {}", n),
            )
        })
        .collect()
}
