//! Aim trainer leaderboard server library.
//!
//! This module exposes the server components for use in tests and binaries.

pub mod client;
pub mod config;
pub mod leaderboard;
pub mod state;
pub mod store;

use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::leaderboard::{list_scores, method_not_allowed, submit_score};
use crate::state::AppState;

pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route(
            "/api/leaderboard",
            get(list_scores)
                .post(submit_score)
                .fallback(method_not_allowed),
        )
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("ignoring unparsable CORS origin {:?}", o);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
