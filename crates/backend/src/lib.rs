//! Stub of the complaints statistics API.
//!
//! Serves canned JSON on the `/debug/*` and `/stats/*` endpoints, with
//! optional status overrides and delays, and records every request it
//! receives. Used for local development of the dashboard and by its
//! end-to-end tests.

pub mod api;
pub mod routes;
pub mod server;
pub mod shared;
pub mod system;

use axum::{http::Method, middleware, Router};
use tower_http::cors::{Any, CorsLayer};

pub use server::StubServer;
pub use shared::{AppState, FixtureResponse, Fixtures, RecordedRequest};

/// Router with CORS and request logging
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    routes::configure_routes(state)
        .layer(middleware::from_fn(system::middleware::request_logger))
        .layer(cors)
}
