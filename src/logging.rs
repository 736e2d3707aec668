// ABOUTME: Structured logging setup for the notification client
// ABOUTME: Picks output format and verbosity, and quiets the HTTP and WebSocket transport crates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Structured logging configuration
//!
//! Logs go to stderr so `eqa-notify list --format json` stays pipeable.
//! `RUST_LOG`, when set, wins over everything configured here.

use crate::config::Environment;
use crate::constants::service_names;
use anyhow::Result;
use std::env;
use std::io;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Transport crates that are far too chatty below `warn`
const QUIET_TARGETS: [&str; 6] = [
    "hyper",
    "hyper_util",
    "reqwest",
    "rustls",
    "tungstenite",
    "tokio_tungstenite",
];

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event, for log shippers
    Json,
    /// Multi-line human output
    #[default]
    Pretty,
    /// Single-line human output
    Compact,
}

impl LogFormat {
    /// Parse `LOG_FORMAT`, falling back to pretty
    #[must_use]
    pub fn from_str_or_default(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Level for this crate's own targets
    pub level: String,
    /// Output format
    pub format: LogFormat,
    /// Include source file and line numbers
    pub include_location: bool,
    /// Include thread ids and names
    pub include_thread: bool,
    /// Deployment environment, logged once at startup
    pub environment: Environment,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
            include_location: false,
            include_thread: false,
            environment: Environment::Development,
        }
    }
}

impl LoggingConfig {
    /// Read `LOG_LEVEL`, `LOG_FORMAT`, `LOG_INCLUDE_LOCATION`, `LOG_INCLUDE_THREAD` and `ENVIRONMENT`
    ///
    /// Production turns location and thread details on.
    #[must_use]
    pub fn from_env() -> Self {
        let environment =
            Environment::from_str_or_default(&env::var("ENVIRONMENT").unwrap_or_default());
        let production = environment.is_production();

        Self {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            format: LogFormat::from_str_or_default(&env::var("LOG_FORMAT").unwrap_or_default()),
            include_location: production || env::var("LOG_INCLUDE_LOCATION").is_ok(),
            include_thread: production || env::var("LOG_INCLUDE_THREAD").is_ok(),
            environment,
        }
    }

    /// Raise the level for each `-v`: one gives debug, two or more give trace
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        match verbosity {
            0 => {}
            1 => "debug".clone_into(&mut self.level),
            _ => "trace".clone_into(&mut self.level),
        }
        self
    }

    fn env_filter(&self) -> EnvFilter {
        if let Ok(from_env) = EnvFilter::try_from_default_env() {
            return from_env;
        }
        let mut directives = vec![format!("warn,eqa_notify={0},eqa_core={0}", self.level)];
        directives.extend(QUIET_TARGETS.iter().map(|target| format!("{target}=warn")));
        EnvFilter::new(directives.join(","))
    }

    /// Install the global subscriber
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed
    pub fn init(&self) -> Result<()> {
        let registry = tracing_subscriber::registry().with(self.env_filter());
        let layer = fmt::layer()
            .with_writer(io::stderr)
            .with_file(self.include_location)
            .with_line_number(self.include_location)
            .with_thread_ids(self.include_thread)
            .with_thread_names(self.include_thread);

        match self.format {
            LogFormat::Json => registry.with(layer.json()).try_init()?,
            LogFormat::Pretty => registry.with(layer.pretty()).try_init()?,
            LogFormat::Compact => registry.with(layer.compact().with_target(false)).try_init()?,
        }

        info!(
            service.name = service_names::EQA_NOTIFY,
            service.version = env!("CARGO_PKG_VERSION"),
            environment = %self.environment,
            log.level = %self.level,
            log.format = ?self.format,
            "Logging initialized"
        );
        Ok(())
    }
}
