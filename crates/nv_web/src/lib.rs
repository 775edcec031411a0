use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

pub mod handlers;
pub mod state;

pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/categories", get(handlers::list_categories))
        .route("/api/articles", get(handlers::list_articles))
        .route("/api/articles/:id", get(handlers::get_article))
        .route("/api/articles/:id/narration", get(handlers::get_narration))
        .route(
            "/api/articles/:id/audio",
            get(handlers::get_audio_clip).post(handlers::create_audio_clip),
        )
        .route("/api/companies", get(handlers::list_companies))
        .route("/api/saved", get(handlers::list_saved))
        .route("/api/saved/:id", post(handlers::toggle_saved))
        .layer(cors)
        .with_state(Arc::new(state))
}

pub async fn serve(state: AppState, addr: SocketAddr) -> nv_core::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🌍 Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, create_app(state)).await?;
    Ok(())
}

pub mod prelude {
    pub use crate::{create_app, serve, AppState};
    pub use nv_core::{Article, Error, Result};
}
