use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use songsync_core::CatalogError;

/// Errors returned to HTTP callers.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Path segment that cannot name any track.
    #[error("Track not found: {0}")]
    UnknownId(String),

    #[error("Malformed JSON body: {0}")]
    MalformedBody(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Catalog(CatalogError::NotFound(_)) | ApiError::UnknownId(_) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Catalog(CatalogError::IdsExhausted) => StatusCode::INSUFFICIENT_STORAGE,
            ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
        };
        (
            status,
            Json(ErrorBody {
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}
