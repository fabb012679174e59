use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::de::DeserializeOwned;

use songsync_core::{NewTrack, Track, TrackPatch};

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/music", get(list_music).post(create_music))
        .route("/music/{id}", put(update_music).delete(delete_music))
}

/// Ids are numeric; anything else simply names no track.
fn parse_id(raw: &str) -> Result<u64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::UnknownId(raw.to_string()))
}

/// Decode a JSON body regardless of its Content-Type. An empty body means
/// no fields were given.
fn parse_body<T>(body: &Bytes) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    Ok(serde_json::from_slice(body)?)
}

/// GET /music - The whole catalog.
async fn list_music(State(state): State<AppState>) -> Json<Vec<Track>> {
    Json(state.service.list().await)
}

/// POST /music - Append a track.
async fn create_music(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Track>), ApiError> {
    let new: NewTrack = parse_body(&body)?;
    let track = state.service.create(new).await?;
    tracing::info!("Created track {}", track.id);
    Ok((StatusCode::CREATED, Json(track)))
}

/// PUT /music/{id} - Merge the given fields into a track.
async fn update_music(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Track>, ApiError> {
    let id = parse_id(&id)?;
    let patch: TrackPatch = parse_body(&body)?;
    let track = state.service.update(id, patch).await?;
    tracing::info!("Updated track {}", id);
    Ok(Json(track))
}

/// DELETE /music/{id} - Remove a track.
async fn delete_music(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Track>, ApiError> {
    let id = parse_id(&id)?;
    let track = state.service.delete(id).await?;
    tracing::info!("Deleted track {}", id);
    Ok(Json(track))
}
