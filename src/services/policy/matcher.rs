use axum::http::Method;

use super::pattern::{PathPattern, PatternError, RequestPath};

/// One public-path rule: requests matching it do not need an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPolicy {
    method: Option<Method>,
    pattern: PathPattern,
}

impl PathPolicy {
    /// Public for every method.
    pub fn public(pattern: &str) -> Result<Self, PatternError> {
        Ok(Self {
            method: None,
            pattern: PathPattern::parse(pattern)?,
        })
    }

    /// Public for a single method only.
    pub fn public_for(method: Method, pattern: &str) -> Result<Self, PatternError> {
        Ok(Self {
            method: Some(method),
            pattern: PathPattern::parse(pattern)?,
        })
    }

    /// Parse a configuration entry: `"/path/**"` or `"GET /path/**"`.
    pub fn parse(entry: &str) -> Result<Self, PatternError> {
        let mut parts = entry.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (None, _, _) => Err(PatternError::Empty),
            (Some(pattern), None, _) => Self::public(pattern),
            (Some(method), Some(pattern), None) => {
                let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes()).map_err(
                    |_| PatternError::InvalidMethod {
                        method: method.to_string(),
                        entry: entry.to_string(),
                    },
                )?;
                Self::public_for(method, pattern)
            }
            (Some(_), Some(_), Some(_)) => Err(PatternError::MalformedEntry(entry.to_string())),
        }
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    fn permits(&self, method: &Method, path: &RequestPath<'_>) -> bool {
        self.method.as_ref().is_none_or(|m| m == method) && self.pattern.matches(path)
    }
}

/// Decides whether a request needs an authenticated identity.
///
/// Borrows the ordered policy list from the shared `GateConfig`; the list is
/// read-only for the lifetime of the process.
#[derive(Debug, Clone, Copy)]
pub struct PolicyMatcher<'a> {
    policies: &'a [PathPolicy],
}

impl<'a> PolicyMatcher<'a> {
    pub fn new(policies: &'a [PathPolicy]) -> Self {
        Self { policies }
    }

    /// First matching policy in configured order, if any.
    pub fn matching_policy(&self, method: &Method, path: &str) -> Option<&'a PathPolicy> {
        let path = RequestPath::parse(path)?;
        self.policies.iter().find(|p| p.permits(method, &path))
    }

    /// `false` for OPTIONS (CORS preflight) and for paths matched by a public policy.
    pub fn requires_auth(&self, method: &Method, path: &str) -> bool {
        if method == Method::OPTIONS {
            return false;
        }
        self.matching_policy(method, path).is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway_policies() -> Vec<PathPolicy> {
        vec![
            PathPolicy::public("/auth-service/**").unwrap(),
            PathPolicy::public("/front-end/**").unwrap(),
            PathPolicy::public("/notifications/api/notification/*/action/url/").unwrap(),
            PathPolicy::public_for(Method::GET, "/health").unwrap(),
        ]
    }

    #[test]
    fn public_prefixes_do_not_require_auth() {
        let policies = gateway_policies();
        let matcher = PolicyMatcher::new(&policies);

        assert!(!matcher.requires_auth(&Method::POST, "/auth-service/login"));
        assert!(!matcher.requires_auth(&Method::GET, "/front-end/main.js"));
        assert!(!matcher.requires_auth(
            &Method::GET,
            "/notifications/api/notification/7/action/url/"
        ));
    }

    #[test]
    fn unmatched_paths_require_auth() {
        let policies = gateway_policies();
        let matcher = PolicyMatcher::new(&policies);

        assert!(matcher.requires_auth(&Method::GET, "/housagotchi/api/tasks"));
        assert!(matcher.requires_auth(&Method::GET, "/auth-service"));
        assert!(matcher.requires_auth(&Method::GET, "/front-end/../housagotchi/api"));
    }

    #[test]
    fn options_is_always_public() {
        let matcher = PolicyMatcher::new(&[]);
        assert!(!matcher.requires_auth(&Method::OPTIONS, "/housagotchi/api/tasks"));
        assert!(!matcher.requires_auth(&Method::OPTIONS, "not-even-a-path"));
    }

    #[test]
    fn method_filter_restricts_policy() {
        let policies = gateway_policies();
        let matcher = PolicyMatcher::new(&policies);

        assert!(!matcher.requires_auth(&Method::GET, "/health"));
        assert!(matcher.requires_auth(&Method::DELETE, "/health"));
    }

    #[test]
    fn first_matching_policy_wins() {
        let policies = vec![
            PathPolicy::public_for(Method::GET, "/docs/*").unwrap(),
            PathPolicy::public("/docs/**").unwrap(),
        ];
        let matcher = PolicyMatcher::new(&policies);

        let hit = matcher.matching_policy(&Method::GET, "/docs/intro").unwrap();
        assert_eq!(hit.method(), Some(&Method::GET));

        let hit = matcher.matching_policy(&Method::POST, "/docs/intro").unwrap();
        assert_eq!(hit.method(), None);
    }

    #[test]
    fn parse_accepts_lowercase_method() {
        let policy = PathPolicy::parse("get /status").unwrap();
        assert_eq!(policy.method(), Some(&Method::GET));
        assert_eq!(policy.pattern(), "/status");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(PathPolicy::parse("   "), Err(PatternError::Empty));
        assert!(matches!(
            PathPolicy::parse("GET /a /b"),
            Err(PatternError::MalformedEntry(_))
        ));
        assert!(matches!(
            PathPolicy::parse("G(T /a"),
            Err(PatternError::InvalidMethod { .. })
        ));
    }
}
