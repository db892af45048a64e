/*!
 * Identity context extractor
 *
 * Responsibility:
 * - 認証済みリクエストの IdentityCtx を handler に提供する
 * - axum 依存は core に閉じ込め、型定義は types に分離する
 *
 * Public API:
 * - IdentityCtx
 * - IdentityCtxExtractor / MaybeIdentityCtx
 */

mod core;
mod types;

pub use core::{IdentityCtxExtractor, MaybeIdentityCtx};
pub use types::IdentityCtx;
