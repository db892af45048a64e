use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;

use crate::config::GateConfig;

/// Classified verification failures.
///
/// Only `MalformedHeader` is surfaced to the caller; every other variant
/// downgrades the request to anonymous.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("credential header does not start with the expected prefix")]
    MalformedHeader,
    #[error("token structure or signature is invalid")]
    InvalidSignature,
    #[error("token claims could not be decoded")]
    MalformedClaims,
    #[error("token has expired")]
    Expired,
    #[error("token has no subject")]
    MissingSubject,
}

/// Claims as they appear on the wire.
///
/// `authorities` and `exp` are required; a missing or mistyped value makes
/// the whole claim set undecodable.
#[derive(Debug, Deserialize)]
struct WireClaims {
    #[serde(default)]
    sub: Option<String>,
    authorities: Vec<String>,
    exp: i64,
}

/// Verified caller identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    pub authorities: BTreeSet<String>,
}

/// HMAC bearer-token verifier.
///
/// Holds only read-only key material, so one instance is shared by every
/// request without synchronization.
#[derive(Clone)]
pub struct BearerVerifier {
    prefix: String,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for BearerVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("BearerVerifier")
            .field("prefix", &self.prefix)
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}

impl BearerVerifier {
    pub fn new(prefix: impl Into<String>, secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS512);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        // Expiry is checked against the caller-supplied clock in `verify`.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            prefix: prefix.into(),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn from_config(config: &GateConfig) -> Self {
        Self::new(config.prefix.clone(), &config.secret)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Verify a raw credential header value (`<prefix><jwt>`) at instant `now`.
    pub fn verify(&self, header_value: &str, now: DateTime<Utc>) -> Result<Identity, TokenError> {
        let token = header_value
            .strip_prefix(self.prefix.as_str())
            .ok_or(TokenError::MalformedHeader)?;

        // Header problems are structural, not claim problems.
        jsonwebtoken::decode_header(token).map_err(|_| TokenError::InvalidSignature)?;

        let claims = jsonwebtoken::decode::<WireClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| classify(e.kind()))?
            .claims;

        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        let subject = match claims.sub {
            Some(sub) if !sub.is_empty() => sub,
            _ => return Err(TokenError::MissingSubject),
        };

        Ok(Identity {
            subject,
            authorities: claims.authorities.into_iter().collect(),
        })
    }
}

fn classify(kind: &ErrorKind) -> TokenError {
    match kind {
        // The signature already verified; the payload itself is unusable.
        ErrorKind::Json(_) | ErrorKind::Utf8(_) => TokenError::MalformedClaims,
        _ => TokenError::InvalidSignature,
    }
}

/// One-shot verification against `secret`.
pub fn verify(
    header_value: &str,
    expected_prefix: &str,
    secret: &[u8],
    now: DateTime<Utc>,
) -> Result<Identity, TokenError> {
    BearerVerifier::new(expected_prefix, secret).verify(header_value, now)
}
