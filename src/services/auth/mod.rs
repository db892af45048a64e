pub mod bearer;
pub mod issuer;

pub use bearer::{BearerVerifier, Identity, TokenError, verify};
pub use issuer::{IssueError, TokenIssuer};
