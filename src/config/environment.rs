// ABOUTME: Environment configuration for the portal backend location and HTTP behaviour
// ABOUTME: Parses EQA_* variables into a validated PortalConfig
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration
//!
//! Configuration is environment-only; there is no configuration file. Push
//! channel reconnection timing is deliberately absent: the transport defaults
//! in [`crate::channel::TransportOptions`] apply.

use super::endpoints::PortalEndpoints;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use tracing::info;
use url::Url;

/// Default backend origin
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default request timeout in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Default connection timeout in seconds
pub const DEFAULT_HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Test runs
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Whether this is a production deployment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Timeouts for the shared HTTP client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpClientConfig {
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
    /// Connection establishment timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_HTTP_CONNECT_TIMEOUT_SECS,
        }
    }
}

/// Login credentials for the portal
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Portal username
    pub username: String,
    /// Portal password
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Portal client configuration
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Backend origin, e.g. `https://eqa.example.org`
    pub base_url: Url,
    /// Deployment sub-path, normalized to `""` or `/name`
    pub subdirectory: String,
    /// HTTP client timeouts
    pub http: HttpClientConfig,
    /// Optional login credentials
    pub credentials: Option<Credentials>,
    /// Optional pre-existing session cookie value
    pub session_cookie: Option<String>,
    /// Deployment environment
    pub environment: Environment,
}

impl PortalConfig {
    /// Build a configuration for the given origin with defaults everywhere else
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the URL cannot be parsed or is not HTTP(S)
    pub fn new(base_url: &str) -> AppResult<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            subdirectory: String::new(),
            http: HttpClientConfig::default(),
            credentials: None,
            session_cookie: None,
            environment: Environment::default(),
        })
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` naming the offending variable when a value cannot
    /// be parsed, or `ConfigMissing` when only one of `EQA_USERNAME` and
    /// `EQA_PASSWORD` is set
    pub fn from_env() -> AppResult<Self> {
        info!("Loading portal configuration from environment variables");

        let base_url = parse_base_url(&env_var_or("EQA_BASE_URL", DEFAULT_BASE_URL))?;
        let subdirectory = normalize_subdirectory(&env_var_or("EQA_SUBDIRECTORY", ""));

        let http = HttpClientConfig {
            timeout_secs: parse_env("EQA_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?,
            connect_timeout_secs: parse_env(
                "EQA_HTTP_CONNECT_TIMEOUT_SECS",
                DEFAULT_HTTP_CONNECT_TIMEOUT_SECS,
            )?,
        };

        let credentials = match (non_empty_env("EQA_USERNAME"), non_empty_env("EQA_PASSWORD")) {
            (Some(username), Some(password)) => Some(Credentials { username, password }),
            (None, None) => None,
            (Some(_), None) => return Err(AppError::config_missing("EQA_PASSWORD")),
            (None, Some(_)) => return Err(AppError::config_missing("EQA_USERNAME")),
        };

        let config = Self {
            base_url,
            subdirectory,
            http,
            credentials,
            session_cookie: non_empty_env("EQA_SESSION_COOKIE"),
            environment: Environment::from_str_or_default(&env_var_or(
                "ENVIRONMENT",
                "development",
            )),
        };
        config.validate()?;

        info!(
            base_url = %config.base_url,
            subdirectory = %config.subdirectory,
            environment = %config.environment,
            "Portal configuration loaded"
        );
        Ok(config)
    }

    /// Override the deployment sub-path
    #[must_use]
    pub fn with_subdirectory(mut self, subdirectory: &str) -> Self {
        self.subdirectory = normalize_subdirectory(subdirectory);
        self
    }

    /// Endpoint URLs for this deployment
    #[must_use]
    pub fn endpoints(&self) -> PortalEndpoints {
        PortalEndpoints::new(&self.base_url, &self.subdirectory)
    }

    fn validate(&self) -> AppResult<()> {
        if self.http.timeout_secs == 0 {
            return Err(AppError::config_invalid(
                "EQA_HTTP_TIMEOUT_SECS must be greater than 0",
            ));
        }
        if self.http.connect_timeout_secs == 0 {
            return Err(AppError::config_invalid(
                "EQA_HTTP_CONNECT_TIMEOUT_SECS must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// Parse and check the backend origin
fn parse_base_url(raw: &str) -> AppResult<Url> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AppError::config_invalid(format!(
            "EQA_BASE_URL must use http or https, got '{other}'"
        ))),
    }
}

/// Normalize a deployment sub-path to `""` or `/segment[/segment]`
#[must_use]
pub fn normalize_subdirectory(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Get a non-blank environment variable
fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse an environment variable, falling back to `default` when unset
fn parse_env<T: FromStr>(key: &str, default: T) -> AppResult<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::config_invalid(format!("{key} has invalid value '{raw}'"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_subdirectory() {
        assert_eq!(normalize_subdirectory(""), "");
        assert_eq!(normalize_subdirectory("/"), "");
        assert_eq!(normalize_subdirectory("rsv"), "/rsv");
        assert_eq!(normalize_subdirectory("/rsv/"), "/rsv");
        assert_eq!(normalize_subdirectory(" eqa/rsv "), "/eqa/rsv");
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let error = PortalConfig::new("ftp://example.org").unwrap_err();
        assert_eq!(error.code, crate::errors::ErrorCode::ConfigInvalid);
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let credentials = Credentials {
            username: "lab".to_owned(),
            password: "hunter2".to_owned(),
        };
        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("lab"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!(Environment::from_str_or_default("PROD"), Environment::Production);
        assert_eq!(Environment::from_str_or_default("test"), Environment::Testing);
        assert_eq!(Environment::from_str_or_default("other"), Environment::Development);
    }
}
