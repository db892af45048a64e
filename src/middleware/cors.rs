//! CORS policy for browser clients of the gateway.
//!
//! Policy:
//! - Development: any origin, WITHOUT credentials.
//! - Production: allowlist origins from Config (comma-separated env var), WITHOUT credentials.
//! - Every method and request header is allowed; the backends behind the
//!   gateway decide what they actually serve.
//!
//! `Access-Control-Expose-Headers` is not set here: the gate adds it on every
//! gated response, preflight included, because it wraps this layer. Local
//! routes outside the gate (`/health`) get CORS without that header.

use std::time::Duration;

use axum::Router;
use axum::http::HeaderValue;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};

use crate::config::{AppEnv, Config};

/// Build the CORS layer for the given environment and allowlist.
pub fn layer(app_env: AppEnv, allowed_origins: &[String]) -> CorsLayer {
    let allow_origin = if app_env.is_production() {
        // An empty allowlist allows no origin at all rather than every origin.
        let allowed: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        AllowOrigin::predicate(move |origin: &HeaderValue, _req| {
            allowed.iter().any(|v| v == origin)
        })
    } else {
        AllowOrigin::from(Any)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::any())
        .allow_headers(AllowHeaders::any())
        .max_age(Duration::from_secs(60 * 10))
}

/// Apply CORS policy to the given Router.
pub fn apply<S>(router: Router<S>, config: &Config) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(layer(config.app_env, &config.cors_allowed_origins))
}
