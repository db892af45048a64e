//! Authentication gate of the portal API gateway.
//!
//! Verifies bearer tokens, applies the public-path policy and decides, once per
//! request, whether the request is forwarded (with or without an identity) or
//! rejected.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
