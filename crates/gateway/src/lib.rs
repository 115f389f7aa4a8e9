//! # Clubhouse Gateway Crate
//!
//! HTTP surface for the chat backend: the `/ws` websocket endpoint the
//! community frontend connects to, plus a health probe. The wider
//! application's CRUD API lives elsewhere; this gateway only fronts the
//! realtime service.

pub mod rest;
pub mod state;
pub mod websocket;

// Re-export main types for convenience
pub use state::GatewayState;

use axum::{http::Method, Router};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router with all routes
pub fn create_router(state: GatewayState) -> Router {
    let arc_state = Arc::new(state);
    Router::new()
        .merge(rest::create_rest_routes().with_state(arc_state.clone()))
        .merge(websocket::create_websocket_routes().with_state(arc_state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
