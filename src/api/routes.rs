use axum::{Router, routing::get};

use crate::api::handlers::{fallback::no_route, health::health};
use crate::state::AppState;

/// Everything the gate sits in front of.
pub fn gated() -> Router<AppState> {
    Router::new().fallback(no_route)
}

/// Answered without consulting the gate; CORS still applies.
pub fn ungated() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
