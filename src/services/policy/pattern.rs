//! Path patterns for public-path policies.
//!
//! Syntax (segments are separated by `/`, the pattern must start with `/`):
//! - `name`  literal segment, exact and case-sensitive
//! - `*`     exactly one non-empty segment, at any position
//! - `**`    one or more non-empty segments; only allowed as the last segment,
//!           so `/front-end/**` matches `/front-end/app.js` and `/front-end/a/b`
//!           but NOT the bare `/front-end`
//! - a trailing `/` on the pattern requires a trailing `/` on the path
//!
//! Each pattern is compiled into its own `matchit` router (`*` becomes a
//! `{segN}` parameter, `**` a `{*rest}` catch-all).
//!
//! Request paths are normalized before matching: a run of trailing slashes
//! collapses into one. A path with an empty inner segment (`//`) or a
//! `.` / `..` segment (also percent-encoded) is never matched, so such paths
//! always fall through to "authentication required".

use std::fmt;
use std::fmt::Write as _;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("empty policy entry")]
    Empty,
    #[error("policy entry must look like '[METHOD ]/pattern': {0}")]
    MalformedEntry(String),
    #[error("pattern must start with '/': {0}")]
    MissingLeadingSlash(String),
    #[error("pattern contains an empty segment: {0}")]
    EmptySegment(String),
    #[error("'**' is only allowed as the last segment: {0}")]
    MisplacedRest(String),
    #[error("wildcards must span a whole segment: {0}")]
    PartialWildcard(String),
    #[error("unknown http method '{method}' in policy '{entry}'")]
    InvalidMethod { method: String, entry: String },
    #[error("pattern '{pattern}' cannot be compiled: {reason}")]
    Route { pattern: String, reason: String },
}

#[derive(Clone)]
pub struct PathPattern {
    raw: String,
    matcher: matchit::Router<()>,
}

impl fmt::Debug for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PathPattern").field(&self.raw).finish()
    }
}

impl PartialEq for PathPattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for PathPattern {}

impl PathPattern {
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        let route = to_matchit_route(raw)?;

        let mut matcher = matchit::Router::new();
        matcher
            .insert(route, ())
            .map_err(|e| PatternError::Route {
                pattern: raw.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            raw: raw.to_string(),
            matcher,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, path: &RequestPath<'_>) -> bool {
        self.matcher.at(path.normalized).is_ok()
    }
}

// "/a/*/b/" -> "/a/{seg1}/b/"; "/a/**" -> "/a/{*rest}"
fn to_matchit_route(raw: &str) -> Result<String, PatternError> {
    let body = raw
        .strip_prefix('/')
        .ok_or_else(|| PatternError::MissingLeadingSlash(raw.to_string()))?;

    if body.is_empty() {
        return Ok("/".to_string());
    }

    let (body, trailing_slash) = match body.strip_suffix('/') {
        Some(rest) => (rest, true),
        None => (body, false),
    };

    let tokens: Vec<&str> = body.split('/').collect();
    let last = tokens.len() - 1;
    let mut route = String::with_capacity(raw.len() + 8);

    for (i, token) in tokens.iter().enumerate() {
        route.push('/');
        match *token {
            "" => return Err(PatternError::EmptySegment(raw.to_string())),
            "**" if i != last || trailing_slash => {
                return Err(PatternError::MisplacedRest(raw.to_string()));
            }
            "**" => route.push_str("{*rest}"),
            "*" => {
                let _ = write!(route, "{{seg{i}}}");
            }
            t if t.contains('*') => return Err(PatternError::PartialWildcard(raw.to_string())),
            t => route.push_str(&t.replace('{', "{{").replace('}', "}}")),
        }
    }

    if trailing_slash {
        route.push('/');
    }
    Ok(route)
}

/// A request path normalized once, shared by every pattern check.
#[derive(Debug, Clone, Copy)]
pub struct RequestPath<'a> {
    normalized: &'a str,
}

impl<'a> RequestPath<'a> {
    /// Returns `None` for paths no public pattern may match: relative paths
    /// and paths with empty inner segments or dot segments.
    pub fn parse(path: &'a str) -> Option<Self> {
        let body = path.strip_prefix('/')?;
        let trimmed = body.trim_end_matches('/');

        if trimmed.is_empty() {
            return Some(Self { normalized: "/" });
        }
        if trimmed
            .split('/')
            .any(|s| s.is_empty() || is_dot_segment(s))
        {
            return None;
        }

        // Keep exactly one of the trailing slashes, if there were any.
        let end = if trimmed.len() == body.len() {
            path.len()
        } else {
            trimmed.len() + 2
        };
        Some(Self {
            normalized: &path[..end],
        })
    }

    pub fn as_str(&self) -> &'a str {
        self.normalized
    }
}

fn is_dot_segment(segment: &str) -> bool {
    let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
    decoded == "." || decoded == ".."
}
