/*
 * Responsibility
 * - Shared context bound to the Router (AppState)
 * - Clone is cheap (Arc inside); nothing in here is mutated after startup
 */
use std::sync::Arc;

use crate::config::GateConfig;
use crate::middleware::gate::Gate;

#[derive(Clone, Debug)]
pub struct AppState {
    pub gate: Arc<Gate>,
}

impl AppState {
    pub fn new(gate: Arc<Gate>) -> Self {
        Self { gate }
    }

    pub fn from_gate_config(config: GateConfig) -> Self {
        Self::new(Arc::new(Gate::new(Arc::new(config))))
    }
}
