/*
 * Responsibility
 * - tracing / panic hook setup
 * - Config読み込み → AppState (gate) 生成 → Router 組み立て
 * - Layer order (outermost first): http (request id, trace, limits) → gate → cors → routes
 * - /health: http → cors → route (no gate, so no exposure header)
 * - axum::serve() で起動
 */
use std::{panic, process};

use anyhow::{Context, Result};
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware::{self, http::HttpLimits};
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,portal_gateway=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env().context("failed to load configuration")?;

    init_panic_hook(!config.app_env.is_production());

    if config.uses_dev_secret {
        tracing::warn!("SECURITY_JWT_SECRET not set; using the development signing secret");
    }

    tracing::info!(
        header = %config.gate.header,
        public_paths = ?config.gate.public_paths.iter().map(|p| p.pattern()).collect::<Vec<_>>(),
        "starting gateway in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = AppState::from_gate_config(config.gate.clone());
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Assemble the gateway router.
pub fn build_router(state: AppState, config: &Config) -> Router {
    let gated = middleware::cors::apply(api::gated(), config);
    let gated = middleware::gate::apply(gated, state.gate.clone());

    // Local routes skip the gate but still answer browser preflights.
    let ungated = middleware::cors::apply(api::ungated(), config);

    let router = gated.merge(ungated).with_state(state);

    middleware::http::apply(router, HttpLimits::from(config))
}
