use axum::{
    extract::State,
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE},
        HeaderValue,
    },
    response::{IntoResponse, Json, Response},
};
use std::{sync::Arc, time::Instant};
use tracing::info;

use crate::{error::ListingError, models::AppState};

/// List every video in the blob store, grouped and ordered for display.
pub async fn videos_handler(State(state): State<Arc<AppState>>) -> Result<Response, ListingError> {
    let start_time = Instant::now();

    let videos = state.videos.list_videos().await?;

    info!(
        "[GET /api/videos] ✅ {} videos in {:.2}s",
        videos.len(),
        start_time.elapsed().as_secs_f64()
    );

    let cache_control = format!("public, max-age={}", state.config.cache_max_age);
    let mut response = Json(videos).into_response();
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(value) = HeaderValue::from_str(&cache_control) {
        headers.insert(CACHE_CONTROL, value);
    }

    Ok(response)
}
