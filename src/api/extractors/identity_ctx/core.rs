use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

use super::IdentityCtx;

/// Extractor for handlers that need an authenticated caller.
///
/// The gate middleware inserts `IdentityCtx` into the request extensions;
/// when it is missing (anonymous request on a public path) this rejects with 401.
pub struct IdentityCtxExtractor(pub IdentityCtx);

impl<S> FromRequestParts<S> for IdentityCtxExtractor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<IdentityCtx>()
            .cloned()
            .map(IdentityCtxExtractor)
            .ok_or(AppError::Unauthorized)
    }
}

/// Optional variant for public routes that behave differently for signed-in callers.
pub struct MaybeIdentityCtx(pub Option<IdentityCtx>);

impl<S> FromRequestParts<S> for MaybeIdentityCtx
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeIdentityCtx(parts.extensions.get::<IdentityCtx>().cloned()))
    }
}
