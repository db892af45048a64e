/*
 * Responsibility
 * - Pure, transport-independent logic of the gate
 *   - auth: bearer-token verification / signing
 *   - policy: public-path matching
 */
pub mod auth;
pub mod policy;
