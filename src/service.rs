use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use songsync_core::{CatalogError, CatalogStore, NewTrack, ServerMessage, Track, TrackPatch};

use crate::ws::hub::{ConnectionHub, ConnectionId};

/// How snapshots are pushed.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub event_name: String,
    pub broadcast_on_list: bool,
}

/// Owns the catalog and pushes a full snapshot to every viewer after each
/// successful operation.
///
/// All operations run under one lock, and the snapshot is broadcast before
/// the lock is released, so viewers see snapshots in mutation order.
pub struct SyncService {
    store: Mutex<Box<dyn CatalogStore>>,
    hub: Arc<ConnectionHub>,
    options: SyncOptions,
}

impl SyncService {
    pub fn new(
        store: impl CatalogStore + 'static,
        hub: Arc<ConnectionHub>,
        options: SyncOptions,
    ) -> Self {
        Self {
            store: Mutex::new(Box::new(store)),
            hub,
            options,
        }
    }

    pub fn hub(&self) -> &Arc<ConnectionHub> {
        &self.hub
    }

    pub fn event_name(&self) -> &str {
        &self.options.event_name
    }

    /// Number of tracks, without notifying anyone.
    pub async fn track_count(&self) -> usize {
        self.store.lock().await.len()
    }

    pub async fn list(&self) -> Vec<Track> {
        let store = self.store.lock().await;
        let tracks = store.list();
        if self.options.broadcast_on_list {
            self.push_snapshot(&tracks).await;
        }
        tracks
    }

    /// List on behalf of a connected viewer. The viewer always gets the
    /// snapshot, either through the broadcast or directly.
    pub async fn list_for(&self, viewer: ConnectionId) -> Vec<Track> {
        let store = self.store.lock().await;
        let tracks = store.list();
        if self.options.broadcast_on_list {
            self.push_snapshot(&tracks).await;
        } else {
            let snapshot = ServerMessage::snapshot(&self.options.event_name, &tracks);
            if let Err(e) = self.hub.send_snapshot_to(viewer, snapshot).await {
                debug!("Could not answer viewer {}: {:?}", viewer, e);
            }
        }
        tracks
    }

    pub async fn create(&self, new: NewTrack) -> Result<Track, CatalogError> {
        let mut store = self.store.lock().await;
        let track = store.create(new)?;
        self.broadcast_locked(&store).await;
        Ok(track)
    }

    pub async fn update(&self, id: u64, patch: TrackPatch) -> Result<Track, CatalogError> {
        let mut store = self.store.lock().await;
        let track = store.update(id, patch)?;
        self.broadcast_locked(&store).await;
        Ok(track)
    }

    pub async fn delete(&self, id: u64) -> Result<Track, CatalogError> {
        let mut store = self.store.lock().await;
        let track = store.delete(id)?;
        self.broadcast_locked(&store).await;
        Ok(track)
    }

    async fn broadcast_locked(&self, store: &MutexGuard<'_, Box<dyn CatalogStore>>) {
        let tracks = store.list();
        self.push_snapshot(&tracks).await;
    }

    async fn push_snapshot(&self, tracks: &[Track]) {
        let report = self
            .hub
            .broadcast(ServerMessage::snapshot(&self.options.event_name, tracks))
            .await;
        debug!(
            "Pushed snapshot of {} tracks to {} viewers ({} dropped)",
            tracks.len(),
            report.delivered,
            report.dropped
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws::ViewerQueue;
    use songsync_core::{demo_tracks, MemoryCatalog};
    use std::time::Duration;

    fn service(store: MemoryCatalog, broadcast_on_list: bool) -> SyncService {
        SyncService::new(
            store,
            Arc::new(ConnectionHub::new(16)),
            SyncOptions {
                event_name: "updateMusicList".to_string(),
                broadcast_on_list,
            },
        )
    }

    fn drain(rx: &mut ViewerQueue) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        while let Some(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    #[tokio::test]
    async fn test_mutation_broadcasts_once_to_each_viewer() {
        let svc = service(MemoryCatalog::new(), true);
        let (_, mut rx1) = svc.hub().register().await;
        let (_, mut rx2) = svc.hub().register().await;

        let track = svc
            .create(NewTrack::new("Song 1", "Artist 1", "Album 1"))
            .await
            .unwrap();

        for rx in [&mut rx1, &mut rx2] {
            let msgs = drain(rx);
            assert_eq!(msgs.len(), 1);
            assert_eq!(
                msgs[0].as_snapshot("updateMusicList"),
                Some(vec![track.clone()])
            );
        }
    }

    #[tokio::test]
    async fn test_not_found_does_not_broadcast() {
        let svc = service(MemoryCatalog::with_tracks(demo_tracks()), true);
        let (_, mut rx) = svc.hub().register().await;

        assert_eq!(svc.delete(42).await, Err(CatalogError::NotFound(42)));
        assert_eq!(
            svc.update(42, TrackPatch::default().title("x")).await,
            Err(CatalogError::NotFound(42))
        );

        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_exhausted_ids_do_not_broadcast() {
        let seed = vec![Track::new(u64::MAX, "Song", "Artist", "Album")];
        let svc = service(MemoryCatalog::with_tracks(seed), true);
        let (_, mut rx) = svc.hub().register().await;

        assert_eq!(
            svc.create(NewTrack::new("Song 2", "A", "B")).await,
            Err(CatalogError::IdsExhausted)
        );
        assert_eq!(svc.track_count().await, 1);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_is_full_catalog_after_delete() {
        let svc = service(MemoryCatalog::with_tracks(demo_tracks()), true);
        let (_, mut rx) = svc.hub().register().await;

        svc.delete(2).await.unwrap();

        let msgs = drain(&mut rx);
        let ids: Vec<u64> = msgs[0]
            .as_snapshot("updateMusicList")
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_list_broadcast_toggle() {
        let svc = service(MemoryCatalog::with_tracks(demo_tracks()), false);
        let (_, mut rx) = svc.hub().register().await;

        assert_eq!(svc.list().await.len(), 3);
        assert!(drain(&mut rx).is_empty());

        let svc = service(MemoryCatalog::with_tracks(demo_tracks()), true);
        let (_, mut rx) = svc.hub().register().await;

        svc.list().await;
        assert_eq!(drain(&mut rx).len(), 1);
    }

    #[tokio::test]
    async fn test_list_for_answers_requester_only_without_broadcast() {
        let svc = service(MemoryCatalog::with_tracks(demo_tracks()), false);
        let (requester, mut rx1) = svc.hub().register().await;
        let (_, mut rx2) = svc.hub().register().await;

        svc.list_for(requester).await;

        assert_eq!(drain(&mut rx1).len(), 1);
        assert!(drain(&mut rx2).is_empty());
    }

    #[tokio::test]
    async fn test_snapshots_follow_mutation_order() {
        let svc = Arc::new(service(MemoryCatalog::new(), false));
        let (_, mut rx) = svc.hub().register().await;

        // A viewer may skip snapshots but never sees an older one after a newer.
        let reader = tokio::spawn(async move {
            let mut lengths = Vec::new();
            let wait = Duration::from_secs(5);
            while let Ok(Some(msg)) = tokio::time::timeout(wait, rx.recv()).await {
                let len = msg.as_snapshot("updateMusicList").unwrap().len();
                lengths.push(len);
                if len == 10 {
                    break;
                }
            }
            lengths
        });

        let mut handles = Vec::new();
        for n in 0..10 {
            let svc = svc.clone();
            handles.push(tokio::spawn(async move {
                svc.create(NewTrack::new(format!("Song {}", n), "A", "B"))
                    .await
                    .unwrap()
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let lengths = reader.await.unwrap();
        assert_eq!(lengths.last(), Some(&10));
        assert!(lengths.windows(2).all(|w| w[0] < w[1]), "{:?}", lengths);
    }
}
