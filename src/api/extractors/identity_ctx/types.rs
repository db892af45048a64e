/*
 * Responsibility
 * - The verified identity a request carries past the gate
 * - Created by the gate middleware (one per request), stored in request extensions,
 *   and read by downstream handlers / routing collaborators
 *
 * Notes
 * - Token parsing stays in services::auth; this type never sees the raw token
 * - Fields are private so the value cannot be altered after the gate built it
 */
use std::collections::BTreeSet;

use crate::services::auth::Identity;

/// Identity established for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityCtx {
    subject: String,
    authorities: BTreeSet<String>,
}

impl IdentityCtx {
    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn authorities(&self) -> &BTreeSet<String> {
        &self.authorities
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }

    /// Authorities joined by `,` in sorted order (trusted header form).
    pub fn authorities_header(&self) -> String {
        self.authorities
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl From<Identity> for IdentityCtx {
    fn from(identity: Identity) -> Self {
        Self {
            subject: identity.subject,
            authorities: identity.authorities,
        }
    }
}
