//! The HTTP/WebSocket ingress surface (C7): accepts hook events over `POST
//! /events`, serves the current `Snapshot` over `GET /state`, and streams
//! coalesced updates over `GET /ws`.

mod envelope;
mod error;
mod handlers;
mod state;
mod ws;

pub use argus_runtime::{InboxEvent, Publisher};
pub use envelope::{EnvelopeError, EventEnvelope};
pub use error::ApiError;
pub use state::AppState;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builds the router with the given shared state. All endpoints are local-only
/// by convention — a local daemon, not a multi-tenant service — so CORS is
/// wide open rather than configured per origin.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/events", post(handlers::post_event))
        .route("/state", get(handlers::get_state))
        .route("/ws", get(ws::ws_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
