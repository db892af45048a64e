//! The gate: one pass/reject decision per request, taken before anything is forwarded.
//!
//! Stages, in order:
//! 1. expose the credential header to cross-origin callers (on every response)
//! 2. read the credential header (absent => anonymous candidate)
//! 3. verify it; a bad prefix rejects with 400, any other failure => anonymous candidate
//! 4. ask the policy matcher; protected path + no identity => 401, otherwise forward
//!
//! On forward, the `IdentityCtx` (if any) is placed into the request extensions and
//! mirrored into the trusted `x-auth-subject` / `x-auth-authorities` headers.
//! Inbound copies of those headers are always dropped.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, Method, Request, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};

use crate::api::extractors::IdentityCtx;
use crate::config::GateConfig;
use crate::error::AppError;
use crate::services::auth::{BearerVerifier, TokenError};
use crate::services::policy::PolicyMatcher;

pub const IDENTITY_SUBJECT_HEADER: HeaderName = HeaderName::from_static("x-auth-subject");
pub const IDENTITY_AUTHORITIES_HEADER: HeaderName = HeaderName::from_static("x-auth-authorities");

/// Why the gate stopped a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Credential header present but not `<prefix><token>`.
    MalformedCredential,
    /// Protected path without a valid identity.
    PolicyDenied,
}

impl From<Rejection> for AppError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::MalformedCredential => AppError::malformed_credential(),
            Rejection::PolicyDenied => AppError::Unauthorized,
        }
    }
}

/// Outcome of the gate for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    Forward(Option<IdentityCtx>),
    Reject(Rejection),
}

/// Request-independent part of the gate, shared by all requests.
#[derive(Debug)]
pub struct Gate {
    config: Arc<GateConfig>,
    verifier: BearerVerifier,
    expose_value: HeaderValue,
}

impl Gate {
    pub fn new(config: Arc<GateConfig>) -> Self {
        let verifier = BearerVerifier::from_config(&config);
        let expose_value = HeaderValue::from(config.header.clone());
        Self {
            config,
            verifier,
            expose_value,
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn matcher(&self) -> PolicyMatcher<'_> {
        PolicyMatcher::new(&self.config.public_paths)
    }

    /// Decide what happens to a request. Pure: no I/O, no shared mutable state.
    pub fn decide(
        &self,
        method: &Method,
        path: &str,
        headers: &HeaderMap,
        now: DateTime<Utc>,
    ) -> AuthDecision {
        let candidate = match headers.get(&self.config.header) {
            None => None,
            Some(raw) if !raw.as_bytes().starts_with(self.config.prefix.as_bytes()) => {
                tracing::debug!(
                    header = %self.config.header,
                    "credential header has the wrong prefix"
                );
                return AuthDecision::Reject(Rejection::MalformedCredential);
            }
            // Right prefix: anything unreadable after it is an invalid token.
            Some(raw) => match raw.to_str() {
                Err(_) => {
                    tracing::debug!(
                        error = %TokenError::InvalidSignature,
                        "token is not visible ASCII; continuing anonymously"
                    );
                    None
                }
                Ok(value) => match self.verifier.verify(value, now) {
                    Ok(identity) => Some(IdentityCtx::from(identity)),
                    Err(err) => {
                        tracing::debug!(error = %err, "token rejected; continuing anonymously");
                        None
                    }
                },
            },
        };

        if !self.matcher().requires_auth(method, path) {
            return AuthDecision::Forward(candidate);
        }

        match candidate {
            Some(identity) => AuthDecision::Forward(Some(identity)),
            None => {
                tracing::debug!(%method, path, "protected path without identity");
                AuthDecision::Reject(Rejection::PolicyDenied)
            }
        }
    }
}

/// Put the gate in front of every route (and the fallback) of `router`.
///
/// ```ignore
/// let gated = middleware::gate::apply(api::gated(), state.gate.clone());
/// let app = gated.merge(api::ungated()).with_state(state);
/// ```
pub fn apply<S>(router: Router<S>, gate: Arc<Gate>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(gate, gate_middleware))
}

async fn gate_middleware(
    State(gate): State<Arc<Gate>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let decision = gate.decide(req.method(), req.uri().path(), req.headers(), Utc::now());

    let mut response = match decision {
        AuthDecision::Forward(identity) => {
            tracing::trace!(
                subject = identity.as_ref().map(|i| i.subject()),
                "forwarding request"
            );
            attach_identity(&mut req, identity);
            next.run(req).await
        }
        AuthDecision::Reject(rejection) => AppError::from(rejection).into_response(),
    };

    response
        .headers_mut()
        .append(header::ACCESS_CONTROL_EXPOSE_HEADERS, gate.expose_value.clone());
    response
}

fn attach_identity(req: &mut Request<Body>, identity: Option<IdentityCtx>) {
    let headers = req.headers_mut();
    headers.remove(&IDENTITY_SUBJECT_HEADER);
    headers.remove(&IDENTITY_AUTHORITIES_HEADER);

    let Some(identity) = identity else {
        return;
    };

    match (
        HeaderValue::from_str(identity.subject()),
        HeaderValue::from_str(&identity.authorities_header()),
    ) {
        (Ok(subject), Ok(authorities)) => {
            headers.insert(IDENTITY_SUBJECT_HEADER, subject);
            headers.insert(IDENTITY_AUTHORITIES_HEADER, authorities);
        }
        _ => tracing::warn!(
            subject = identity.subject(),
            "identity not representable as headers; extensions only"
        ),
    }

    req.extensions_mut().insert(identity);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::TokenIssuer;
    use crate::services::policy::PathPolicy;

    const SECRET: &[u8] = b"gate-secret";

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn gate() -> Gate {
        let config = GateConfig::new(SECRET).with_public_paths(vec![
            PathPolicy::public("/auth-service/**").unwrap(),
            PathPolicy::public("/front-end/**").unwrap(),
        ]);
        Gate::new(Arc::new(config))
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn token(secret: &[u8], exp: i64, subject: &str) -> String {
        TokenIssuer::new(secret, 0)
            .issue_until(subject, &["ROLE_USER".to_string()], now(), exp)
            .map(|t| format!("Bearer {t}"))
            .unwrap()
    }

    #[test]
    fn valid_token_on_protected_path_forwards_identity() {
        let headers = headers_with(&token(SECRET, now().timestamp() + 60, "alice"));
        match gate().decide(&Method::GET, "/housagotchi/api", &headers, now()) {
            AuthDecision::Forward(Some(identity)) => {
                assert_eq!(identity.subject(), "alice");
                assert!(identity.has_authority("ROLE_USER"));
            }
            other => panic!("unexpected decision: {other:?}"),
        }
    }

    #[test]
    fn missing_header_on_protected_path_is_denied() {
        assert_eq!(
            gate().decide(&Method::GET, "/housagotchi/api", &HeaderMap::new(), now()),
            AuthDecision::Reject(Rejection::PolicyDenied)
        );
    }

    #[test]
    fn missing_header_on_public_path_forwards_anonymously() {
        assert_eq!(
            gate().decide(&Method::POST, "/auth-service/login", &HeaderMap::new(), now()),
            AuthDecision::Forward(None)
        );
    }

    #[test]
    fn foreign_signature_is_anonymous_not_rejected_up_front() {
        let headers = headers_with(&token(b"other", now().timestamp() + 60, "mallory"));
        assert_eq!(
            gate().decide(&Method::GET, "/front-end/index.html", &headers, now()),
            AuthDecision::Forward(None)
        );
        assert_eq!(
            gate().decide(&Method::GET, "/housagotchi/api", &headers, now()),
            AuthDecision::Reject(Rejection::PolicyDenied)
        );
    }

    #[test]
    fn token_expired_one_second_ago_is_denied_on_protected_path() {
        let headers = headers_with(&token(SECRET, now().timestamp() - 1, "alice"));
        assert_eq!(
            gate().decide(&Method::GET, "/housagotchi/api", &headers, now()),
            AuthDecision::Reject(Rejection::PolicyDenied)
        );
    }

    #[test]
    fn options_is_forwarded_without_credentials() {
        assert_eq!(
            gate().decide(&Method::OPTIONS, "/housagotchi/api", &HeaderMap::new(), now()),
            AuthDecision::Forward(None)
        );
    }

    #[test]
    fn wrong_prefix_is_rejected_before_policy_evaluation() {
        let headers = headers_with("Basic YWxpY2U6c2VjcmV0");
        assert_eq!(
            gate().decide(&Method::GET, "/auth-service/login", &headers, now()),
            AuthDecision::Reject(Rejection::MalformedCredential)
        );
        assert_eq!(
            gate().decide(&Method::GET, "/housagotchi/api", &headers, now()),
            AuthDecision::Reject(Rejection::MalformedCredential)
        );
    }

    #[test]
    fn non_ascii_token_after_the_prefix_is_anonymous() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xc3\xa9abc").unwrap(),
        );
        assert_eq!(
            gate().decide(&Method::GET, "/front-end/app.js", &headers, now()),
            AuthDecision::Forward(None)
        );
        assert_eq!(
            gate().decide(&Method::GET, "/housagotchi/api", &headers, now()),
            AuthDecision::Reject(Rejection::PolicyDenied)
        );
    }

    #[test]
    fn non_ascii_header_without_the_prefix_is_malformed() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(b"\xc3\xa9 Bearer abc").unwrap(),
        );
        assert_eq!(
            gate().decide(&Method::GET, "/front-end/app.js", &headers, now()),
            AuthDecision::Reject(Rejection::MalformedCredential)
        );
    }

    #[test]
    fn custom_header_name_is_honoured() {
        let mut config = GateConfig::new(SECRET);
        config.header = HeaderName::from_static("x-portal-token");
        let gate = Gate::new(Arc::new(config));

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-portal-token",
            HeaderValue::from_str(&token(SECRET, now().timestamp() + 60, "erin")).unwrap(),
        );
        assert!(matches!(
            gate.decide(&Method::GET, "/anything", &headers, now()),
            AuthDecision::Forward(Some(_))
        ));

        // The standard header is ignored when another one is configured.
        let headers = headers_with(&token(SECRET, now().timestamp() + 60, "erin"));
        assert_eq!(
            gate.decide(&Method::GET, "/anything", &headers, now()),
            AuthDecision::Reject(Rejection::PolicyDenied)
        );
    }

    #[test]
    fn rejections_map_to_distinct_statuses() {
        assert_eq!(
            AppError::from(Rejection::PolicyDenied).status(),
            axum::http::StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(Rejection::MalformedCredential).status(),
            axum::http::StatusCode::BAD_REQUEST
        );
    }
}
