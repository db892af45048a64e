use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use crate::config::GateConfig;

#[derive(Debug, Error)]
pub enum IssueError {
    #[error("subject must not be empty")]
    EmptySubject,
    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Serialize)]
struct IssuedClaims<'a> {
    sub: &'a str,
    authorities: &'a [String],
    iat: i64,
    exp: i64,
    jti: String,
}

/// HS512 token signer sharing the gate's secret.
///
/// Tokens carry `sub`, `authorities`, `iat`, `exp` and a random `jti`.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    ttl_seconds: u64,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl_seconds: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            ttl_seconds,
        }
    }

    pub fn from_config(config: &GateConfig) -> Self {
        Self::new(&config.secret, config.expiration_seconds)
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Issue a token valid for the configured lifetime starting at `now`.
    pub fn issue(
        &self,
        subject: &str,
        authorities: &[String],
        now: DateTime<Utc>,
    ) -> Result<String, IssueError> {
        let exp = now.timestamp().saturating_add_unsigned(self.ttl_seconds);
        self.issue_until(subject, authorities, now, exp)
    }

    /// Issue a token with an explicit `exp` (unix seconds).
    pub fn issue_until(
        &self,
        subject: &str,
        authorities: &[String],
        now: DateTime<Utc>,
        exp: i64,
    ) -> Result<String, IssueError> {
        if subject.trim().is_empty() {
            return Err(IssueError::EmptySubject);
        }

        let claims = IssuedClaims {
            sub: subject,
            authorities,
            iat: now.timestamp(),
            exp,
            jti: Uuid::new_v4().to_string(),
        };

        let mut header = Header::new(Algorithm::HS512);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign JWT");
            IssueError::Signing(e)
        })
    }
}
