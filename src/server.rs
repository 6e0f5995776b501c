use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

use crate::{
    blob, config::Config, handlers::videos_handler, listing::VideoLister, models::AppState,
    system_info,
};

pub fn build_router(state: Arc<AppState>) -> Router {
    let router = Router::new().route("/api/videos", get(videos_handler));

    let router = match state.config.static_dir.as_ref() {
        Some(dir) if dir.is_dir() => router.fallback_service(ServeDir::new(dir)),
        Some(dir) => {
            warn!("Static directory {:?} not found, serving API only", dir);
            router
        }
        None => router,
    };

    router
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(config: Config) -> anyhow::Result<()> {
    system_info::print_startup_info(&config);

    let store = blob::connect(&config)?;
    if store.is_none() {
        warn!("BLOB_READ_WRITE_TOKEN is not set; /api/videos will answer with 500");
    }

    let state = Arc::new(AppState {
        videos: VideoLister::new(&config, store),
        config: config.clone(),
    });

    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    info!("🚀 Server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!("{}", "=".repeat(60));
    println!("✅ Server running on http://0.0.0.0:{}", config.port);
    println!("✅ Videos endpoint at http://localhost:{}/api/videos", config.port);
    println!("{}", "=".repeat(60));

    info!("✅ Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
