/*
 * Responsibility
 * - Load settings from the environment (listen port, CORS allowlist, JWT settings, public paths)
 * - Validate them up front (startup fails on missing/invalid values)
 * - Build the immutable `GateConfig` shared by the verifier and the policy matcher
 */
use std::net::SocketAddr;
use std::str::FromStr;
use std::{env, fmt};

use axum::http::HeaderName;
use thiserror::Error;

use crate::services::policy::{PathPolicy, PatternError};

const DEFAULT_PUBLIC_PATHS: &str =
    "/auth-service/**,/front-end/**,/notifications/api/notification/*/action/url/";

const DEV_SECRET: &str = "JwtSecretKey";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
    #[error("invalid public path policy: {0}")]
    Policy(#[from] PatternError),
}

/// Security settings of the gate.
///
/// Built once at startup and shared read-only (behind `Arc`) by the token
/// verifier and the policy matcher. Never mutated after construction.
#[derive(Clone)]
pub struct GateConfig {
    pub header: HeaderName,
    pub prefix: String,
    pub expiration_seconds: u64,
    pub secret: Vec<u8>,
    pub public_paths: Vec<PathPolicy>,
}

impl fmt::Debug for GateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("GateConfig")
            .field("header", &self.header)
            .field("prefix", &self.prefix)
            .field("expiration_seconds", &self.expiration_seconds)
            .field("public_paths", &self.public_paths)
            .finish_non_exhaustive()
    }
}

impl GateConfig {
    /// Settings with the gateway defaults (`Authorization` / `Bearer ` / 24h) and no public paths.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            header: axum::http::header::AUTHORIZATION,
            prefix: "Bearer ".to_string(),
            expiration_seconds: 24 * 60 * 60,
            secret: secret.into(),
            public_paths: Vec::new(),
        }
    }

    pub fn with_public_paths(mut self, public_paths: Vec<PathPolicy>) -> Self {
        self.public_paths = public_paths;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,
    pub request_timeout_seconds: u64,
    pub request_body_limit_bytes: usize,

    pub gate: GateConfig,

    // true when SECURITY_JWT_SECRET was not provided (development only)
    pub uses_dev_secret: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = match env::var("PORT") {
            Ok(s) => s.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            Err(_) => 8762,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins =
            split_list(&env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default());

        let request_timeout_seconds = env::var("REQUEST_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let request_body_limit_bytes = env::var("REQUEST_BODY_LIMIT_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(1024 * 1024);

        let header = match env::var("SECURITY_JWT_HEADER") {
            Ok(v) => HeaderName::from_str(v.trim())
                .map_err(|_| ConfigError::Invalid("SECURITY_JWT_HEADER"))?,
            Err(_) => axum::http::header::AUTHORIZATION,
        };

        let prefix = env::var("SECURITY_JWT_PREFIX").unwrap_or_else(|_| "Bearer ".to_string());
        if prefix.is_empty() {
            return Err(ConfigError::Invalid("SECURITY_JWT_PREFIX"));
        }

        let expiration_seconds = match env::var("SECURITY_JWT_EXPIRATION") {
            Ok(v) => v
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("SECURITY_JWT_EXPIRATION"))?,
            Err(_) => 24 * 60 * 60,
        };

        let (secret, uses_dev_secret) = match env::var("SECURITY_JWT_SECRET") {
            Ok(v) if v.is_empty() => return Err(ConfigError::Invalid("SECURITY_JWT_SECRET")),
            Ok(v) => (v.into_bytes(), false),
            Err(_) if app_env.is_production() => {
                return Err(ConfigError::Missing("SECURITY_JWT_SECRET"));
            }
            Err(_) => (DEV_SECRET.as_bytes().to_vec(), true),
        };

        let public_paths = parse_public_paths(
            &env::var("SECURITY_PUBLIC_PATHS").unwrap_or_else(|_| DEFAULT_PUBLIC_PATHS.to_string()),
        )?;

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            request_timeout_seconds,
            request_body_limit_bytes,
            gate: GateConfig {
                header,
                prefix,
                expiration_seconds,
                secret,
                public_paths,
            },
            uses_dev_secret,
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse the ordered, comma-separated public path list (`[METHOD ]pattern` entries).
pub fn parse_public_paths(raw: &str) -> Result<Vec<PathPolicy>, ConfigError> {
    split_list(raw)
        .iter()
        .map(|entry| PathPolicy::parse(entry).map_err(ConfigError::from))
        .collect()
}
