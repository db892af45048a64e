pub mod identity_ctx;

pub use identity_ctx::{IdentityCtx, IdentityCtxExtractor, MaybeIdentityCtx};
