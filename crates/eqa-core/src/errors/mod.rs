// ABOUTME: Unified error type and error codes shared by every notification client component
// ABOUTME: Maps transport, parse, and configuration failures onto a single AppError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling
//!
//! Every component boundary (Snapshot Loader, Push Channel Client, Dismissal
//! Coordinator, configuration) converts its failures into [`AppError`] so that
//! callers handle one error shape. Logical no-ops such as dismissing an unknown
//! notification are never represented as errors.

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the client
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Authentication (1000-1999)
    /// No usable session is available
    AuthRequired = 1000,
    /// The backend rejected the supplied credentials or cookie
    AuthInvalid = 1001,

    // Validation (3000-3999)
    /// Caller supplied an invalid argument
    InvalidInput = 3000,
    /// A required field was absent from a payload
    MissingRequiredField = 3001,
    /// A payload could not be interpreted
    InvalidFormat = 3002,

    // Resources (4000-4999)
    /// The backend does not know the requested resource
    ResourceNotFound = 4000,

    // External Services (5000-5999)
    /// The backend answered with a non-success status
    ExternalServiceError = 5000,
    /// The backend could not be reached
    ExternalServiceUnavailable = 5001,

    // Configuration (6000-6999)
    /// A required configuration value is missing
    ConfigMissing = 6001,
    /// A configuration value is present but invalid
    ConfigInvalid = 6002,

    // Internal (9000-9999)
    /// Unexpected internal failure (task join, closed channel)
    InternalError = 9000,
    /// Serialization or deserialization failed
    SerializationError = 9003,
}

impl ErrorCode {
    /// HTTP-equivalent status for this error
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::InvalidInput | Self::MissingRequiredField | Self::InvalidFormat => 400,
            Self::AuthRequired | Self::AuthInvalid => 401,
            Self::ResourceNotFound => 404,
            Self::ExternalServiceError => 502,
            Self::ExternalServiceUnavailable => 503,
            Self::ConfigMissing
            | Self::ConfigInvalid
            | Self::InternalError
            | Self::SerializationError => 500,
        }
    }

    /// User-facing description of this error
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::AuthRequired => "Authentication is required to access this resource",
            Self::AuthInvalid => "The provided authentication credentials are invalid",
            Self::InvalidInput => "The provided input is invalid",
            Self::MissingRequiredField => "A required field is missing",
            Self::InvalidFormat => "The data format is invalid",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::ExternalServiceError => "The backend service reported an error",
            Self::ExternalServiceUnavailable => "The backend service is currently unavailable",
            Self::ConfigMissing => "Required configuration is missing",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::InternalError => "An internal error occurred",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }

    /// Whether retrying the same operation later may succeed
    #[must_use]
    pub const fn is_transient(self) -> bool {
        matches!(
            self,
            Self::ExternalServiceError | Self::ExternalServiceUnavailable
        )
    }
}

/// Unified error type for the client
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Identifier of the resource involved, when one applies
    pub resource_id: Option<String>,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl AppError {
    /// Create a new error with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            resource_id: None,
            source: None,
        }
    }

    /// Attach the identifier of the resource involved
    #[must_use]
    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    /// Attach a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// HTTP-equivalent status for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Whether retrying the same operation later may succeed
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        self.code.is_transient()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors for common errors
impl AppError {
    /// No session available
    pub fn auth_required() -> Self {
        Self::new(ErrorCode::AuthRequired, "Authentication required")
    }

    /// Credentials or cookie rejected
    pub fn auth_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthInvalid, message)
    }

    /// Invalid caller input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Required payload field missing
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingRequiredField,
            format!("Missing required field '{field}'"),
        )
    }

    /// Payload could not be interpreted
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidFormat, message)
    }

    /// Resource not found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Backend answered with a non-success status
    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ExternalServiceError,
            format!("{}: {}", service.into(), message.into()),
        )
    }

    /// Backend unreachable
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExternalServiceUnavailable, message)
    }

    /// Configuration value missing
    pub fn config_missing(variable: &str) -> Self {
        Self::new(
            ErrorCode::ConfigMissing,
            format!("{variable} must be set"),
        )
    }

    /// Configuration value invalid
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalid, message)
    }

    /// Internal failure
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(ErrorCode::SerializationError, error.to_string()).with_source(error)
    }
}

impl From<url::ParseError> for AppError {
    fn from(error: url::ParseError) -> Self {
        Self::new(ErrorCode::ConfigInvalid, format!("Invalid URL: {error}")).with_source(error)
    }
}

#[cfg(feature = "http-errors")]
impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        let code = if error.is_decode() {
            ErrorCode::SerializationError
        } else if error.is_status() {
            ErrorCode::ExternalServiceError
        } else {
            ErrorCode::ExternalServiceUnavailable
        };
        Self::new(code, error.to_string()).with_source(error)
    }
}

#[cfg(feature = "ws-errors")]
impl From<tokio_tungstenite::tungstenite::Error> for AppError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::new(ErrorCode::ExternalServiceUnavailable, error.to_string()).with_source(error)
    }
}
