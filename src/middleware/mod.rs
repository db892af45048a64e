/*
 * Responsibility
 * - Router-level layers of the gateway
 *   - gate: credential verification + public-path policy (the pass/reject decision)
 *   - cors: cross-origin policy
 *   - http: request id, access log, body limit, timeout
 */
pub mod cors;
pub mod gate;
pub mod http;
