pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::adapters::http::state::HttpState;

pub fn router(state: HttpState) -> Router {
    Router::new()
        .route("/hello", get(routes::hello))
        .route("/extract-text", post(routes::extract_text))
        .route("/submit", post(routes::submit))
        // Las fotos de documentos superan con facilidad el límite por defecto.
        .layer(DefaultBodyLimit::disable())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
