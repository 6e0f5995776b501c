use axum::{
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

/// Errors from the blob store client.
#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("blob store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("blob store error: {0}")]
    Backend(String),
}

/// Errors surfaced by the video listing endpoint.
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("BLOB_READ_WRITE_TOKEN is not configured")]
    Configuration,

    #[error("failed to retrieve videos: {0}")]
    Retrieval(#[from] BlobError),
}

impl IntoResponse for ListingError {
    fn into_response(self) -> Response {
        error!("[GET /api/videos] ❌ {}", self);

        let body = match self {
            ListingError::Configuration => ErrorResponse {
                error: "Blob token is not configured".to_string(),
                hint: Some(
                    "Make sure BLOB_READ_WRITE_TOKEN is set in the environment".to_string(),
                ),
            },
            ListingError::Retrieval(_) => ErrorResponse {
                error: "Failed to retrieve videos".to_string(),
                hint: None,
            },
        };

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(CONTENT_TYPE, "application/json")],
            Json(body),
        )
            .into_response()
    }
}
