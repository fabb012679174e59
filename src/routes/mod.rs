pub mod health;
pub mod music;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::ws;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(music::routes())
        .merge(health::routes())
        .route("/ws", get(ws::handler::ws_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
