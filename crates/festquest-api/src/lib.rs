//! Festquest API server library.
//!
//! Exposes the router, application state and configuration so that the
//! binary and the integration tests assemble the service the same way.

pub mod config;
pub mod error;
pub mod pending;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the full application router.
pub fn build_router(app_state: AppState) -> Router {
    // TODO: Replace CorsLayer::permissive() with the festival front-end origins.
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/quest", routes::quest::router())
        .nest("/api/v1/stickers", routes::sticker::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
