pub mod config;
pub mod handler;
pub mod storage;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use media_core::Pipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// ルーティング
///
/// - `POST /`, `POST /images`: 画像の取り込み
/// - `GET /`, `GET /images?name=...&rotate=true`: 画像の取得
/// - `GET /health`: ヘルスチェック
pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handler::retrieve).post(handler::ingest))
        .route("/images", get(handler::retrieve).post(handler::ingest))
        .route("/health", get(handler::health))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
