/*
 * Responsibility
 * - Gateway-local routes (/health, fallback) and the identity extractors
 */
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::{gated, ungated};
