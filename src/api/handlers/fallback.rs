/*
 * Responsibility
 * - Answer requests that passed the gate but have no local route
 * - Proxy dispatch to backend services lives outside this crate; embedders
 *   replace this fallback with their routing layer
 */
use axum::http::Uri;

use crate::api::extractors::MaybeIdentityCtx;
use crate::error::AppError;

pub async fn no_route(uri: Uri, MaybeIdentityCtx(identity): MaybeIdentityCtx) -> AppError {
    tracing::debug!(
        path = %uri.path(),
        subject = identity.as_ref().map(|i| i.subject()),
        "no route for gated request"
    );
    AppError::not_found("route")
}
