//! Path-based access policy: which requests may pass without an identity.

mod matcher;
mod pattern;

pub use matcher::{PathPolicy, PolicyMatcher};
pub use pattern::{PathPattern, PatternError, RequestPath};
